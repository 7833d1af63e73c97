//! Mock Initialization Client
//!
//! For testing and demo purposes. Hands out deterministic hosted links
//! without touching the network, and honors the cancellation token.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use checkout_core::{
    CancellationToken, CheckoutError, PreparedRequest, Result, SessionInitializer, Url,
};

/// What the mock answers with
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// `{base}/{tx_ref}`
    Link { base: String },

    /// Always fail with this error
    Fail(CheckoutError),
}

/// Mock initializer with a configurable answer and latency
pub struct MockInitializer {
    behavior: MockBehavior,
    latency: Duration,
    calls: AtomicUsize,
    last_request: Mutex<Option<PreparedRequest>>,
}

impl Default for MockInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInitializer {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Link {
            base: "https://checkout.example.test/pay".into(),
        })
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always fails
    pub fn failing(error: CheckoutError) -> Self {
        Self::with_behavior(MockBehavior::Fail(error))
    }

    /// Simulate network latency (for cancellation tests)
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of times `initialize` was entered
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<PreparedRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }

    fn answer(&self, request: &PreparedRequest) -> Result<Url> {
        match &self.behavior {
            MockBehavior::Link { base } => {
                let raw = format!("{}/{}", base.trim_end_matches('/'), request.tx_ref());
                Url::parse(&raw).map_err(|e| CheckoutError::MalformedResponse(e.to_string()))
            }
            MockBehavior::Fail(err) => Err(err.clone()),
        }
    }
}

#[async_trait]
impl SessionInitializer for MockInitializer {
    async fn initialize(&self, request: &PreparedRequest, token: &CancellationToken) -> Result<Url> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if token.is_cancelled() {
            return Err(CheckoutError::Aborted);
        }

        tokio::select! {
            biased;
            () = token.cancelled() => Err(CheckoutError::Aborted),
            () = tokio::time::sleep(self.latency) => self.answer(request),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
