//! Request lifecycle orchestration for the summarizer.
//!
//! Owns the form input and the request state machine, dispatches the remote
//! call as a background task, and applies the settlement when it lands.

use crate::client::{ClientError, SummarizeApi, SummaryResponse};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default maximum summary length sent with text requests
pub const DEFAULT_MAX_LENGTH: u32 = 200;

const TEXT_FAILURE: &str = "Failed to summarize text";
const URL_FAILURE: &str = "Failed to summarize URL";
const URL_SUMMARY_FALLBACK: &str = "No summary available.";

/// Form values owned by the controller.
///
/// Both fields persist independently between submissions; a submit reads
/// whichever one its path needs and leaves the other untouched.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub text: String,
    pub url: String,
    pub max_length: u32,
}

impl Default for RequestInput {
    fn default() -> Self {
        Self {
            text: String::new(),
            url: String::new(),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// Lifecycle of a single summarization request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded(String),
    Failed(String),
}

impl RequestState {
    /// Pure transition function.
    ///
    /// Submitting clears any prior summary or error. A settlement is only
    /// meaningful while a request is in flight; anywhere else it is a no-op.
    pub fn apply(self, event: RequestEvent) -> RequestState {
        match (self, event) {
            (_, RequestEvent::Submit) => RequestState::InFlight,
            (RequestState::InFlight, RequestEvent::Settled(Settlement::Succeeded(summary))) => {
                RequestState::Succeeded(summary)
            }
            (RequestState::InFlight, RequestEvent::Settled(Settlement::Failed(message))) => {
                RequestState::Failed(message)
            }
            (state, RequestEvent::Settled(_)) => state,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }
}

/// Events applied to [`RequestState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    Submit,
    Settled(Settlement),
}

/// Outcome of a settled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Succeeded(String),
    Failed(String),
}

impl Settlement {
    /// Fold a text-endpoint result into a settlement.
    ///
    /// A response without a `summary` field yields the empty string.
    pub fn from_text_response(result: Result<SummaryResponse, ClientError>) -> Self {
        match result {
            Ok(response) => Settlement::Succeeded(response.summary.unwrap_or_default()),
            Err(error) => {
                warn!(%error, "text summarization failed");
                Settlement::Failed(TEXT_FAILURE.to_string())
            }
        }
    }

    /// Fold a URL-endpoint result into a settlement.
    ///
    /// A response without a `summary` field yields the literal
    /// "No summary available." (the URL endpoint may legitimately omit it).
    pub fn from_url_response(result: Result<SummaryResponse, ClientError>) -> Self {
        match result {
            Ok(response) => Settlement::Succeeded(
                response
                    .summary
                    .unwrap_or_else(|| URL_SUMMARY_FALLBACK.to_string()),
            ),
            Err(error) => {
                warn!(%error, "URL summarization failed");
                Settlement::Failed(URL_FAILURE.to_string())
            }
        }
    }
}

/// Which submit path produced a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubmitKind {
    Text,
    Url,
}

impl SubmitKind {
    fn failure_message(self) -> &'static str {
        match self {
            SubmitKind::Text => TEXT_FAILURE,
            SubmitKind::Url => URL_FAILURE,
        }
    }
}

/// An outstanding request and the generation it belongs to
struct Pending {
    generation: u64,
    kind: SubmitKind,
    handle: JoinHandle<Settlement>,
}

/// Drives the request state machine against a [`SummarizeApi`].
///
/// Submitting transitions to `InFlight` synchronously and spawns the remote
/// call; [`RequestController::poll`] applies the settlement once the task
/// finishes. Each submit bumps a generation counter and replaces the pending
/// slot, so a response from a superseded request is discarded rather than
/// overwriting a newer state.
pub struct RequestController {
    client: Arc<dyn SummarizeApi>,
    pub input: RequestInput,
    state: RequestState,
    generation: u64,
    pending: Option<Pending>,
}

impl RequestController {
    pub fn new(client: Arc<dyn SummarizeApi>) -> Self {
        Self {
            client,
            input: RequestInput::default(),
            state: RequestState::Idle,
            generation: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Busy flag consumed by the presentation layer to disable submit keys
    pub fn is_busy(&self) -> bool {
        self.state.is_in_flight()
    }

    /// Submit the current text for summarization.
    ///
    /// Empty text is accepted and sent as-is.
    pub fn submit_text(&mut self) {
        let text = self.input.text.clone();
        let max_length = self.input.max_length;
        let client = Arc::clone(&self.client);
        let handle = tokio::spawn(async move {
            Settlement::from_text_response(client.summarize_text(&text, max_length).await)
        });
        self.begin(SubmitKind::Text, handle);
    }

    /// Submit the current URL for summarization
    pub fn submit_url(&mut self) {
        let url = self.input.url.clone();
        let client = Arc::clone(&self.client);
        let handle = tokio::spawn(async move {
            Settlement::from_url_response(client.summarize_url(&url).await)
        });
        self.begin(SubmitKind::Url, handle);
    }

    fn begin(&mut self, kind: SubmitKind, handle: JoinHandle<Settlement>) {
        self.generation += 1;
        self.state = std::mem::take(&mut self.state).apply(RequestEvent::Submit);
        debug!(generation = self.generation, ?kind, "request submitted");
        self.pending = Some(Pending {
            generation: self.generation,
            kind,
            handle,
        });
    }

    /// Poll the outstanding request without blocking.
    ///
    /// Returns the settlement exactly once, on the call where the background
    /// task has finished. A settlement whose generation no longer matches the
    /// controller's is dropped.
    pub async fn poll(&mut self) -> Option<Settlement> {
        let finished = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.handle.is_finished());
        if !finished {
            return None;
        }

        let pending = self.pending.take()?;
        let settlement = match pending.handle.await {
            Ok(settlement) => settlement,
            Err(error) => {
                warn!(%error, "request task failed");
                Settlement::Failed(pending.kind.failure_message().to_string())
            }
        };

        if pending.generation != self.generation {
            debug!(
                generation = pending.generation,
                current = self.generation,
                "discarding stale settlement"
            );
            return None;
        }

        debug!(generation = pending.generation, "request settled");
        self.state = std::mem::take(&mut self.state).apply(RequestEvent::Settled(settlement.clone()));
        Some(settlement)
    }

    /// Return to the idle form state, discarding any outstanding request.
    ///
    /// The form inputs are retained.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.state = RequestState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Canned reply for one endpoint of the stub service
    #[derive(Clone)]
    enum StubReply {
        Summary(Option<&'static str>),
        Failure,
    }

    struct StubApi {
        text_reply: StubReply,
        url_reply: StubReply,
        text_gate: Option<Arc<Notify>>,
        seen_text: Mutex<Option<(String, u32)>>,
    }

    impl StubApi {
        fn new(text_reply: StubReply, url_reply: StubReply) -> Self {
            Self {
                text_reply,
                url_reply,
                text_gate: None,
                seen_text: Mutex::new(None),
            }
        }

        /// Hold the text endpoint open until the gate is notified
        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.text_gate = Some(gate);
            self
        }
    }

    #[async_trait::async_trait]
    impl SummarizeApi for StubApi {
        async fn summarize_text(
            &self,
            text: &str,
            max_length: u32,
        ) -> Result<SummaryResponse, ClientError> {
            if let Some(gate) = &self.text_gate {
                gate.notified().await;
            }
            *self.seen_text.lock().unwrap() = Some((text.to_string(), max_length));
            match &self.text_reply {
                StubReply::Summary(summary) => Ok(SummaryResponse {
                    summary: summary.map(String::from),
                }),
                StubReply::Failure => Err(ClientError::Status(500)),
            }
        }

        async fn summarize_url(&self, _url: &str) -> Result<SummaryResponse, ClientError> {
            match &self.url_reply {
                StubReply::Summary(summary) => Ok(SummaryResponse {
                    summary: summary.map(String::from),
                }),
                StubReply::Failure => Err(ClientError::Status(502)),
            }
        }
    }

    async fn settle(controller: &mut RequestController) -> Settlement {
        loop {
            if let Some(settlement) = controller.poll().await {
                return settlement;
            }
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn submit_transition_clears_prior_outcome() {
        let state = RequestState::Failed("Failed to summarize text".into());
        assert_eq!(state.apply(RequestEvent::Submit), RequestState::InFlight);

        let state = RequestState::Succeeded("old".into());
        assert_eq!(state.apply(RequestEvent::Submit), RequestState::InFlight);
    }

    #[test]
    fn settlement_outside_in_flight_is_ignored() {
        let state = RequestState::Idle;
        let settled = state.apply(RequestEvent::Settled(Settlement::Succeeded("S".into())));
        assert_eq!(settled, RequestState::Idle);
    }

    #[test]
    fn in_flight_settles_to_outcome() {
        let ok = RequestState::InFlight
            .apply(RequestEvent::Settled(Settlement::Succeeded("S".into())));
        assert_eq!(ok, RequestState::Succeeded("S".into()));

        let err = RequestState::InFlight
            .apply(RequestEvent::Settled(Settlement::Failed("nope".into())));
        assert_eq!(err, RequestState::Failed("nope".into()));
    }

    #[tokio::test]
    async fn submit_text_is_in_flight_before_the_call_settles() {
        let gate = Arc::new(Notify::new());
        let stub = StubApi::new(StubReply::Summary(Some("Hi.")), StubReply::Failure)
            .gated(Arc::clone(&gate));
        let mut controller = RequestController::new(Arc::new(stub));
        controller.input.text = "Hello world".to_string();

        controller.submit_text();
        assert!(controller.is_busy());
        assert_eq!(controller.state(), &RequestState::InFlight);

        gate.notify_one();
        let settlement = settle(&mut controller).await;
        assert_eq!(settlement, Settlement::Succeeded("Hi.".to_string()));
        assert_eq!(controller.state(), &RequestState::Succeeded("Hi.".to_string()));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn text_submit_forwards_input_and_max_length() {
        let stub = Arc::new(StubApi::new(
            StubReply::Summary(Some("Hi.")),
            StubReply::Failure,
        ));
        let mut controller = RequestController::new(Arc::clone(&stub) as Arc<dyn SummarizeApi>);
        controller.input.text = "Hello world".to_string();
        controller.input.max_length = 120;

        controller.submit_text();
        settle(&mut controller).await;

        let seen = stub.seen_text.lock().unwrap().clone();
        assert_eq!(seen, Some(("Hello world".to_string(), 120)));
    }

    #[tokio::test]
    async fn text_response_without_summary_defaults_to_empty() {
        let stub = StubApi::new(StubReply::Summary(None), StubReply::Failure);
        let mut controller = RequestController::new(Arc::new(stub));

        controller.submit_text();
        let settlement = settle(&mut controller).await;
        assert_eq!(settlement, Settlement::Succeeded(String::new()));
    }

    #[tokio::test]
    async fn url_response_without_summary_uses_fallback_literal() {
        let stub = StubApi::new(StubReply::Failure, StubReply::Summary(None));
        let mut controller = RequestController::new(Arc::new(stub));
        controller.input.url = "http://example.com/a".to_string();

        controller.submit_url();
        let settlement = settle(&mut controller).await;
        assert_eq!(
            settlement,
            Settlement::Succeeded("No summary available.".to_string())
        );
    }

    #[tokio::test]
    async fn failures_collapse_to_static_messages() {
        let stub = StubApi::new(StubReply::Failure, StubReply::Failure);
        let mut controller = RequestController::new(Arc::new(stub));

        controller.submit_text();
        let settlement = settle(&mut controller).await;
        assert_eq!(
            settlement,
            Settlement::Failed("Failed to summarize text".to_string())
        );
        assert_eq!(
            controller.state(),
            &RequestState::Failed("Failed to summarize text".to_string())
        );

        controller.submit_url();
        let settlement = settle(&mut controller).await;
        assert_eq!(
            settlement,
            Settlement::Failed("Failed to summarize URL".to_string())
        );
    }

    #[tokio::test]
    async fn newer_submit_supersedes_an_outstanding_request() {
        let gate = Arc::new(Notify::new());
        // Text is held open; the URL call settles immediately.
        let stub = StubApi::new(StubReply::Summary(Some("slow")), StubReply::Summary(Some("fast")))
            .gated(Arc::clone(&gate));
        let mut controller = RequestController::new(Arc::new(stub));

        controller.submit_text();
        controller.submit_url();
        assert!(controller.is_busy());

        let settlement = settle(&mut controller).await;
        assert_eq!(settlement, Settlement::Succeeded("fast".to_string()));

        // Let the superseded text request finish; its result must not land.
        gate.notify_one();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(controller.poll().await, None);
        assert_eq!(
            controller.state(),
            &RequestState::Succeeded("fast".to_string())
        );
    }

    #[tokio::test]
    async fn reset_returns_to_idle_and_keeps_inputs() {
        let stub = StubApi::new(StubReply::Summary(Some("Hi.")), StubReply::Failure);
        let mut controller = RequestController::new(Arc::new(stub));
        controller.input.text = "keep me".to_string();

        controller.submit_text();
        settle(&mut controller).await;
        controller.reset();

        assert_eq!(controller.state(), &RequestState::Idle);
        assert_eq!(controller.input.text, "keep me");
    }
}
