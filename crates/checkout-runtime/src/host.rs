//! Host Callback Surface

use async_trait::async_trait;

use checkout_core::{CheckoutError, InitializationError, RedirectOutcome};

/// Callbacks into the host application
///
/// Everything except [`HostCallbacks::on_complete`] is optional. Callbacks run
/// on the controller task and must not block.
#[async_trait]
pub trait HostCallbacks: Send + Sync {
    fn on_will_initialize(&self) {}

    fn on_did_initialize(&self) {}

    fn on_initialize_error(&self, _error: &InitializationError) {}

    fn on_abort(&self) {}

    /// The processor reported a terminal outcome
    fn on_complete(&self, outcome: &RedirectOutcome);

    /// A redirect hit the endpoint without a usable status
    fn on_redirect_error(&self, error: &CheckoutError) {
        tracing::error!(error = %error, "Unhandled malformed checkout redirect");
    }

    /// Yes/no prompt shown before leaving the embedded browser
    async fn confirm_abort(&self) -> bool {
        true
    }
}
