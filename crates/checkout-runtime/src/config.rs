//! Controller Configuration

use chrono::Duration;

use checkout_core::{CheckoutError, DEFAULT_REDIRECT_URL, RedirectEndpoint, Result, SessionPolicy};

/// Controller configuration
#[derive(Clone, Debug, Default)]
pub struct ControllerConfig {
    /// In-app redirect endpoint the processor navigates to when done
    pub redirect: RedirectEndpoint,

    /// Maximum age of a cached session link (None = reuse indefinitely)
    pub link_ttl: Option<Duration>,
}

impl ControllerConfig {
    /// Create from environment variables
    ///
    /// Reads `CHECKOUT_REDIRECT_URL` and `CHECKOUT_LINK_TTL_SECS`.
    pub fn from_env() -> Result<Self> {
        let redirect_url =
            std::env::var("CHECKOUT_REDIRECT_URL").unwrap_or_else(|_| DEFAULT_REDIRECT_URL.into());

        let link_ttl = match std::env::var("CHECKOUT_LINK_TTL_SECS") {
            Ok(raw) => Some(parse_ttl(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            redirect: RedirectEndpoint::parse(&redirect_url)?,
            link_ttl,
        })
    }

    pub fn policy(&self) -> SessionPolicy {
        SessionPolicy {
            redirect: self.redirect.clone(),
            link_ttl: self.link_ttl,
        }
    }
}

fn parse_ttl(raw: &str) -> Result<Duration> {
    let secs: i64 = raw.trim().parse().map_err(|_| {
        CheckoutError::Config(format!("CHECKOUT_LINK_TTL_SECS must be an integer, got '{raw}'"))
    })?;
    if secs <= 0 {
        return Err(CheckoutError::Config("CHECKOUT_LINK_TTL_SECS must be positive".into()));
    }
    Duration::try_seconds(secs)
        .ok_or_else(|| CheckoutError::Config(format!("CHECKOUT_LINK_TTL_SECS out of range: {secs}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.redirect.url().as_str(), DEFAULT_REDIRECT_URL);
        assert!(config.policy().link_ttl.is_none());
    }

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl("900").unwrap(), Duration::minutes(15));
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl("soon").is_err());
        assert!(matches!(
            parse_ttl("9223372036854775807"),
            Err(CheckoutError::Config(_))
        ));
    }
}
