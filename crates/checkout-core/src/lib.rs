//! # checkout-core
//!
//! Payment session lifecycle for an embedded (in-app browser) checkout.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  Event   ┌───────────────────┐  Effect  ┌──────────────────┐
//! │ Host / Display│────────▶│  reduce(state, ev) │────────▶│ Runtime executes │
//! └──────────────┘          └───────────────────┘          └──────────────────┘
//!                               │            │
//!                     classify()│            │SessionRequest::prepare()
//!                               ▼            ▼
//!                     Redirect Interpreter   SessionInitializer (strategy)
//! ```
//!
//! Nothing here performs I/O. The network call sits behind
//! [`SessionInitializer`] and the display lives in the runtime crate.

pub mod cancel;
pub mod error;
pub mod initializer;
pub mod redirect;
pub mod reducer;
pub mod request;
pub mod session;

pub use cancel::CancellationToken;
pub use error::{CheckoutError, InitializationError, Result};
pub use initializer::SessionInitializer;
pub use redirect::{DEFAULT_REDIRECT_URL, RedirectEndpoint, RedirectOutcome, RedirectStatus, classify};
pub use reducer::{Effect, Event, reduce};
pub use request::{
    Currency, Customer, Customizations, PaymentOption, PreparedRequest, SessionRequest, SubAccount,
};
pub use session::{
    Attempt, AttemptId, Phase, SessionLink, SessionPolicy, SessionSnapshot, SessionState,
};

// Re-exported so dependents share one version of these types
pub use url::Url;
