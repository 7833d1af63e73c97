//! Initialization Client Strategy
//!
//! Implement [`SessionInitializer`] for each processor transport. The
//! controller only ever talks to this trait.

use async_trait::async_trait;
use url::Url;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::request::PreparedRequest;

/// Creates a hosted payment session and returns its link
#[async_trait]
pub trait SessionInitializer: Send + Sync {
    /// Request a session link for `request`.
    ///
    /// Must fail with [`crate::CheckoutError::Aborted`] when `token` fires
    /// before or during the call, and must not retry on its own.
    async fn initialize(&self, request: &PreparedRequest, token: &CancellationToken) -> Result<Url>;

    /// Processor name for logs
    fn name(&self) -> &str;
}
