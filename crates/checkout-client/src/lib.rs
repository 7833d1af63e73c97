//! # checkout-client
//!
//! Initialization clients that turn a [`checkout_core::PreparedRequest`] into
//! a hosted payment-session link.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  POST /v3/payments   ┌─────────────────┐
//! │ Controller  │─────────────────────▶│   Processor     │
//! │             │◀─────────────────────│ {data: {link}}  │
//! └─────────────┘   hosted link        └─────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_client::{ClientConfig, HttpInitializer};
//!
//! let client = HttpInitializer::new(ClientConfig::from_env()?)?;
//! let link = client.initialize(&request.prepare(&endpoint), &token).await?;
//! ```

mod config;
mod http;
pub mod mock;

pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use http::HttpInitializer;
pub use mock::{MockBehavior, MockInitializer};
