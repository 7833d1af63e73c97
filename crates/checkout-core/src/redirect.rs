//! Redirect Interpreter
//!
//! Decides whether a navigated location is the processor's completion
//! redirect and, if so, extracts the outcome it reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CheckoutError, Result};

/// Default in-app redirect target injected into every session request
pub const DEFAULT_REDIRECT_URL: &str = "https://flutterwave.com/rn-redirect";

/// The fixed endpoint the processor navigates to on completion or cancellation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectEndpoint(Url);

impl RedirectEndpoint {
    pub fn parse(s: &str) -> Result<Self> {
        let url = Url::parse(s)
            .map_err(|e| CheckoutError::Config(format!("invalid redirect url '{s}': {e}")))?;
        if url.host_str().is_none() {
            return Err(CheckoutError::Config(format!("redirect url '{s}' has no host")));
        }
        Ok(Self(url))
    }

    pub const fn url(&self) -> &Url {
        &self.0
    }

    /// Host and path comparison; query, fragment and scheme are ignored
    pub fn matches(&self, location: &Url) -> bool {
        location.host_str() == self.0.host_str()
            && trim_slash(location.path()) == trim_slash(self.0.path())
    }
}

impl Default for RedirectEndpoint {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_REDIRECT_URL).expect("default redirect url is valid"))
    }
}

fn trim_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => path,
    }
}

/// Terminal status reported by the processor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectStatus {
    Successful,
    Cancelled,
}

impl RedirectStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RedirectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome extracted from a redirect navigation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectOutcome {
    pub status: RedirectStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_ref: Option<String>,

    /// Query keys the processor sent that have no dedicated field
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl RedirectOutcome {
    pub const fn is_successful(&self) -> bool {
        matches!(self.status, RedirectStatus::Successful)
    }
}

/// Classify a navigated location.
///
/// Returns `Ok(None)` when the location is not the redirect endpoint (the
/// display keeps navigating), `Ok(Some(..))` for a terminal redirect, and
/// [`CheckoutError::MalformedRedirect`] when the endpoint was hit without a
/// recognizable `status`.
pub fn classify(endpoint: &RedirectEndpoint, location: &str) -> Result<Option<RedirectOutcome>> {
    let Ok(url) = Url::parse(location) else {
        return Ok(None);
    };
    if !endpoint.matches(&url) {
        return Ok(None);
    }

    // Percent-decoding only: a literal `+` stays a plus, not a space
    let query = url.query().unwrap_or_default().replace('+', "%2B");
    let mut params: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.insert(key.into_owned(), value.trim().to_string());
    }

    let malformed = |reason: String| CheckoutError::MalformedRedirect {
        location: location.to_string(),
        reason,
    };

    let status = match params.remove("status").as_deref() {
        Some("successful") => RedirectStatus::Successful,
        Some("cancelled") => RedirectStatus::Cancelled,
        Some(other) => return Err(malformed(format!("unrecognized status '{other}'"))),
        None => return Err(malformed("missing status".into())),
    };

    Ok(Some(RedirectOutcome {
        status,
        transaction_id: params.remove("transaction_id"),
        tx_ref: params.remove("tx_ref"),
        extra: params,
    }))
}
