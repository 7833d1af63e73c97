//! Client Configuration

use std::time::Duration;

use checkout_core::{CheckoutError, Result, Url};

/// Hosted-payment endpoint of the processor's standard checkout API
pub const DEFAULT_ENDPOINT: &str = "https://api.flutterwave.com/v3/payments";

/// Initialization client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Endpoint that creates hosted payment sessions
    pub endpoint: Url,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is valid"),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables
    ///
    /// `CHECKOUT_ENDPOINT` and `CHECKOUT_TIMEOUT_SECS` override the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("CHECKOUT_ENDPOINT") {
            config.endpoint = Self::parse_endpoint(&endpoint)?;
        }

        if let Ok(raw) = std::env::var("CHECKOUT_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|_| {
                CheckoutError::Config(format!("CHECKOUT_TIMEOUT_SECS must be an integer, got '{raw}'"))
            })?;
        }

        Ok(config)
    }

    /// Builder-style endpoint override
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Self::parse_endpoint(endpoint)?;
        Ok(self)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn parse_endpoint(raw: &str) -> Result<Url> {
        let url = Url::parse(raw)
            .map_err(|e| CheckoutError::Config(format!("invalid endpoint '{raw}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CheckoutError::Config(format!(
                "endpoint scheme must be http or https, got '{other}'"
            ))),
        }
    }
}
