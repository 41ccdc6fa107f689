//! HTTP client for the remote summarization service.
//!
//! Uses reqwest against the AIConcise backend API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("concise/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned status {0}")]
    Status(u16),
}

/// Request body for the text summarization endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextRequest<'a> {
    text: &'a str,
    max_length: u32,
}

/// Response body from either summarization endpoint.
///
/// The URL endpoint may omit `summary`; the caller decides the fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: Option<String>,
}

/// Transport seam for the summarization service.
///
/// The orchestration layer only depends on this trait, so tests can run
/// against an in-process mock instead of a live service.
#[async_trait]
pub trait SummarizeApi: Send + Sync {
    /// Summarize a block of raw text, bounded by `max_length`
    async fn summarize_text(
        &self,
        text: &str,
        max_length: u32,
    ) -> Result<SummaryResponse, ClientError>;

    /// Summarize the article behind a URL
    async fn summarize_url(&self, url: &str) -> Result<SummaryResponse, ClientError>;
}

/// reqwest-backed client for the summarization service
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl SummarizeApi for ApiClient {
    async fn summarize_text(
        &self,
        text: &str,
        max_length: u32,
    ) -> Result<SummaryResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint("/api/summarize"))
            .json(&TextRequest { text, max_length })
            .send()
            .await?;

        // Non-2xx is a uniform failure; the body is not inspected.
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn summarize_url(&self, url: &str) -> Result<SummaryResponse, ClientError> {
        let response = self
            .http
            .get(self.endpoint("/api/summarize-url"))
            .query(&[("url", url)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_uses_camel_case_on_the_wire() {
        let body = serde_json::to_value(TextRequest {
            text: "Hello world",
            max_length: 200,
        })
        .unwrap();

        assert_eq!(body["text"], "Hello world");
        assert_eq!(body["maxLength"], 200);
    }

    #[test]
    fn response_with_summary_field() {
        let response: SummaryResponse = serde_json::from_str(r#"{"summary":"Hi."}"#).unwrap();
        assert_eq!(response.summary.as_deref(), Some("Hi."));
    }

    #[test]
    fn response_without_summary_field() {
        let response: SummaryResponse = serde_json::from_str("{}").unwrap();
        assert!(response.summary.is_none());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:5001/", Duration::from_secs(30)).unwrap();
        assert_eq!(
            client.endpoint("/api/summarize"),
            "http://localhost:5001/api/summarize"
        );
    }
}
