//! Incremental reveal of a completed summary.
//!
//! The summary is fully received before anything is shown; the reveal is a
//! purely cosmetic typewriter effect. Frames are an explicit finite sequence
//! of growing prefixes, driven by a tokio timer and delivered over a channel.

use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

/// Default delay between revealed characters
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

/// Finite sequence of growing prefixes of a source string.
///
/// Each step reveals exactly one more character, so the number of frames
/// equals the character count and the last frame is the full source.
#[derive(Debug, Clone)]
pub struct RevealFrames {
    source: String,
    total: usize,
    emitted: usize,
}

impl RevealFrames {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let total = source.chars().count();
        Self {
            source,
            total,
            emitted: 0,
        }
    }

    /// Total number of frames the sequence will produce
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for RevealFrames {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.emitted >= self.total {
            return None;
        }
        self.emitted += 1;
        Some(self.source.chars().take(self.emitted).collect())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.emitted;
        (remaining, Some(remaining))
    }
}

/// Drives a [`RevealFrames`] sequence on a wall-clock timer.
///
/// Each `start` supersedes the previous reveal: the old driving task is
/// aborted and its channel closes, so two summaries never interleave.
pub struct RevealRenderer {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl RevealRenderer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    /// Begin revealing `source` from the first character.
    ///
    /// Returns the receiving end of this reveal's frame channel. The first
    /// frame is emitted immediately, subsequent frames one interval apart;
    /// the channel closes once the full source has been emitted.
    pub fn start(&mut self, source: impl Into<String>) -> UnboundedReceiver<String> {
        self.cancel();

        let frames = RevealFrames::new(source);
        let interval = self.interval;
        let (tx, rx) = mpsc::unbounded_channel();
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            for frame in frames {
                ticker.tick().await;
                if tx.send(frame).is_err() {
                    break;
                }
            }
        }));

        rx
    }

    /// Stop a reveal in progress; the frame channel for it closes
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RevealRenderer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Type `source` to a writer with reveal pacing, used by one-shot CLI mode
pub async fn type_out<W: Write>(
    writer: &mut W,
    source: &str,
    interval: Duration,
) -> std::io::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    for ch in source.chars() {
        ticker.tick().await;
        write!(writer, "{ch}")?;
        writer.flush()?;
    }
    writeln!(writer)?;
    Ok(())
}
