//! # checkout-runtime
//!
//! Runs the checkout state machine against real collaborators.
//!
//! ```text
//! ┌────────────┐ begin/abort  ┌────────────┐ initialize ┌──────────────────┐
//! │    Host    │─────────────▶│ Controller │───────────▶│ SessionInitializer│
//! │ (callbacks)│◀─────────────│  (1 task)  │◀───────────│   (spawned)      │
//! └────────────┘  outcomes    └────────────┘   result   └──────────────────┘
//!                              │   ▲
//!                   show/hide  │   │ navigated / transition done
//!                              ▼   │
//!                         ┌─────────────┐
//!                         │DisplaySurface│
//!                         └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let handle = Controller::spawn(initializer, display, host, request, ControllerConfig::from_env()?);
//! handle.begin();
//! // from the web view:
//! handle.navigated(location);
//! ```

mod config;
mod controller;
mod display;
mod host;

pub use config::ControllerConfig;
pub use controller::{Controller, ControllerHandle};
pub use display::{DisplaySurface, Transition};
pub use host::HostCallbacks;

// Re-export core types for convenience
pub use checkout_core::{
    CheckoutError, InitializationError, Phase, RedirectOutcome, RedirectStatus, SessionRequest,
    SessionSnapshot,
};
