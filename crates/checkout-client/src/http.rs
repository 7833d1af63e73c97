//! Hosted Checkout Initialization
//!
//! POSTs the prepared session request to the processor and extracts the
//! hosted-page link from its response.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use checkout_core::{
    CancellationToken, CheckoutError, PreparedRequest, Result, SessionInitializer, Url,
};

use crate::config::ClientConfig;

/// Code used when the processor rejects a request without naming a code
const DEFAULT_ERROR_CODE: &str = "STANDARD_INIT_ERROR";

/// reqwest-backed initialization client
pub struct HttpInitializer {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpInitializer {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CheckoutError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, request: &PreparedRequest) -> Result<Url> {
        request.request().validate()?;

        tracing::debug!(
            endpoint = %self.config.endpoint,
            tx_ref = %request.tx_ref(),
            "Requesting hosted payment link"
        );

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(request.authorization())
            .json(request)
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        parse_response(status, &body)
    }
}

#[async_trait]
impl SessionInitializer for HttpInitializer {
    async fn initialize(&self, request: &PreparedRequest, token: &CancellationToken) -> Result<Url> {
        if token.is_cancelled() {
            return Err(CheckoutError::Aborted);
        }

        tokio::select! {
            biased;
            () = token.cancelled() => {
                tracing::debug!(tx_ref = %request.tx_ref(), "Initialization request cancelled");
                Err(CheckoutError::Aborted)
            }
            result = self.send(request) => result,
        }
    }

    fn name(&self) -> &str {
        "flutterwave-standard"
    }
}

/// Processor response envelope
#[derive(Debug, Deserialize)]
struct InitResponse {
    status: String,

    #[serde(default)]
    message: Option<String>,

    #[serde(default)]
    code: Option<String>,

    #[serde(default)]
    data: Option<InitData>,

    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
struct InitData {
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    field: Option<String>,
    message: String,
}

impl FieldError {
    fn render(&self) -> String {
        match &self.field {
            Some(field) => format!("{field}: {}", self.message),
            None => self.message.clone(),
        }
    }
}

fn parse_response(status: StatusCode, body: &str) -> Result<Url> {
    let payload: InitResponse = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) if status.is_success() => {
            return Err(CheckoutError::MalformedResponse(e.to_string()));
        }
        Err(_) => return Err(CheckoutError::Transport(format!("HTTP {status}"))),
    };

    if status.is_success() && payload.status.eq_ignore_ascii_case("success") {
        let link = payload
            .data
            .and_then(|d| d.link)
            .ok_or_else(|| CheckoutError::MalformedResponse("response carried no link".into()))?;

        return Url::parse(&link)
            .map_err(|e| CheckoutError::MalformedResponse(format!("invalid link '{link}': {e}")));
    }

    Err(CheckoutError::Initialization {
        code: payload.code.unwrap_or_else(|| DEFAULT_ERROR_CODE.to_string()),
        message: payload
            .message
            .unwrap_or_else(|| format!("Payment initialization failed (HTTP {status})")),
        errors: payload.errors.iter().map(FieldError::render).collect(),
    })
}
