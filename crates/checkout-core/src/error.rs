//! Checkout Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cancellation token fired before or during initialization
    #[error("Initialization aborted")]
    Aborted,

    /// Transaction reference reused without a cached session link
    #[error("Duplicate transaction reference: {0}")]
    DuplicateReference(String),

    /// Processor rejected the initialization request
    #[error("Processor error [{code}]: {message}")]
    Initialization {
        code: String,
        message: String,
        errors: Vec<String>,
    },

    /// Network or HTTP-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Processor answered without a usable session link
    #[error("Malformed processor response: {0}")]
    MalformedResponse(String),

    /// Redirect navigation matched the endpoint but carried no valid status
    #[error("Malformed redirect {location}: {reason}")]
    MalformedRedirect { location: String, reason: String },

    /// Session request failed validation
    #[error("Invalid session request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckoutError {
    /// Whether this is the deliberate-cancellation classification
    pub const fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Stable machine-readable code reported to the host
    pub fn code(&self) -> &str {
        match self {
            Self::Aborted => "ABORTERROR",
            Self::DuplicateReference(_) => "SAME_TXREF",
            Self::Initialization { code, .. } => code,
            Self::Transport(_) => "STANDARD_INIT_ERROR",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::MalformedRedirect { .. } => "MALFORMED_REDIRECT",
            Self::InvalidRequest(_) => "INVALID_OPTIONS",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Aborted => "The payment was cancelled.".into(),
            Self::DuplicateReference(_) => "Please generate a new transaction reference.".into(),
            Self::Initialization { message, .. } => message.clone(),
            Self::Transport(_) => "Could not reach the payment service. Please try again.".into(),
            Self::MalformedResponse(_) => {
                "The payment service returned an unexpected response.".into()
            }
            Self::MalformedRedirect { .. } => {
                "The payment status could not be determined. Please verify the transaction."
                    .into()
            }
            Self::InvalidRequest(msg) => format!("Invalid payment options: {msg}"),
            Self::Config(_) => "Service configuration error.".into(),
        }
    }
}

/// Error record handed to the host's `on_initialize_error` callback
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} ({code})")]
pub struct InitializationError {
    pub message: String,
    pub code: String,

    /// Field-level validation messages from the processor, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl InitializationError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            errors: Vec::new(),
        }
    }
}

impl From<&CheckoutError> for InitializationError {
    fn from(err: &CheckoutError) -> Self {
        let errors = match err {
            CheckoutError::Initialization { errors, .. } => errors.clone(),
            _ => Vec::new(),
        };
        Self {
            message: err.user_message(),
            code: err.code().to_string(),
            errors,
        }
    }
}

impl From<CheckoutError> for InitializationError {
    fn from(err: CheckoutError) -> Self {
        Self::from(&err)
    }
}
