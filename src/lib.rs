//! # Concise
//!
//! A terminal client for AI-powered text and article summarisation.
//!
//! ## Features
//!
//! - **Two request paths**: raw text or an article URL, sent to a remote summarization service
//! - **Typed lifecycle**: requests move Idle → InFlight → Succeeded/Failed; a stale response can never overwrite a newer one
//! - **Typewriter reveal**: finished summaries are revealed character by character without blocking input

pub mod client;
pub mod config;
pub mod controller;
pub mod reveal;
pub mod ui;

pub use config::Config;
pub use controller::{RequestController, RequestState};
pub use reveal::RevealRenderer;
