//! Session Request
//!
//! Processor-facing configuration for a single payment. The caller never
//! supplies a redirect target: [`SessionRequest::prepare`] is the only way to
//! build the wire payload and it always injects the fixed redirect endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CheckoutError, Result};
use crate::redirect::RedirectEndpoint;

/// Supported settlement currencies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ngn,
    Usd,
    Gbp,
    Ghs,
    Kes,
    Zar,
    Tzs,
}

impl Currency {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ngn => "NGN",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Ghs => "GHS",
            Self::Kes => "KES",
            Self::Zar => "ZAR",
            Self::Tzs => "TZS",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment methods the hosted checkout can offer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOption {
    Account,
    Card,
    BankTransfer,
    Mpesa,
    MobileMoneyRwanda,
    MobileMoneyZambia,
    Qr,
    MobileMoneyUganda,
    Ussd,
    Credit,
    Barter,
    MobileMoneyGhana,
    PayAttitude,
    MobileMoneyFranco,
    Paga,
    #[serde(rename = "1voucher")]
    OneVoucher,
    MobileMoneyTanzania,
}

impl PaymentOption {
    pub const ALL: [Self; 17] = [
        Self::Account,
        Self::Card,
        Self::BankTransfer,
        Self::Mpesa,
        Self::MobileMoneyRwanda,
        Self::MobileMoneyZambia,
        Self::Qr,
        Self::MobileMoneyUganda,
        Self::Ussd,
        Self::Credit,
        Self::Barter,
        Self::MobileMoneyGhana,
        Self::PayAttitude,
        Self::MobileMoneyFranco,
        Self::Paga,
        Self::OneVoucher,
        Self::MobileMoneyTanzania,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Card => "card",
            Self::BankTransfer => "banktransfer",
            Self::Mpesa => "mpesa",
            Self::MobileMoneyRwanda => "mobilemoneyrwanda",
            Self::MobileMoneyZambia => "mobilemoneyzambia",
            Self::Qr => "qr",
            Self::MobileMoneyUganda => "mobilemoneyuganda",
            Self::Ussd => "ussd",
            Self::Credit => "credit",
            Self::Barter => "barter",
            Self::MobileMoneyGhana => "mobilemoneyghana",
            Self::PayAttitude => "payattitude",
            Self::MobileMoneyFranco => "mobilemoneyfranco",
            Self::Paga => "paga",
            Self::OneVoucher => "1voucher",
            Self::MobileMoneyTanzania => "mobilemoneytanzania",
        }
    }

    /// Parse a comma-separated option list (`"card, ussd"`)
    ///
    /// Unknown and repeated options are rejected.
    pub fn parse_list(s: &str) -> Result<Vec<Self>> {
        let mut options = Vec::new();
        for raw in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let option: Self = raw.parse()?;
            if options.contains(&option) {
                return Err(CheckoutError::InvalidRequest(format!(
                    "payment option '{raw}' listed more than once"
                )));
            }
            options.push(option);
        }
        Ok(options)
    }

    /// Join options into the processor's comma-separated form
    pub fn join(options: &[Self]) -> String {
        options
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::str::FromStr for PaymentOption {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == lowered)
            .ok_or_else(|| CheckoutError::InvalidRequest(format!("unknown payment option '{s}'")))
    }
}

mod payment_options_csv {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::PaymentOption;

    pub fn serialize<S: Serializer>(options: &[PaymentOption], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&PaymentOption::join(options))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PaymentOption>, D::Error> {
        let raw = String::deserialize(d)?;
        PaymentOption::parse_list(&raw).map_err(serde::de::Error::custom)
    }
}

/// Paying customer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonenumber: Option<String>,
}

/// Hosted page branding
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customizations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Split-settlement sub-account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAccount {
    pub id: String,
}

/// Configuration for one payment attempt
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Processor credential, sent as a bearer header and never in the body
    #[serde(default, skip_serializing)]
    pub authorization: String,

    /// Caller-unique transaction reference
    pub tx_ref: String,

    pub amount: Decimal,

    pub currency: Currency,

    pub customer: Customer,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_hash: Option<String>,

    /// Allowed subset of payment methods (empty = processor default)
    #[serde(default, with = "payment_options_csv", skip_serializing_if = "Vec::is_empty")]
    pub payment_options: Vec<PaymentOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subaccounts: Vec<SubAccount>,

    /// Arbitrary metadata entries passed through to the processor
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<serde_json::Map<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customizations: Option<Customizations>,
}

impl std::fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRequest")
            .field("authorization", &"[redacted]")
            .field("tx_ref", &self.tx_ref)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("customer", &self.customer)
            .field("integrity_hash", &self.integrity_hash)
            .field("payment_options", &self.payment_options)
            .field("payment_plan", &self.payment_plan)
            .field("subaccounts", &self.subaccounts)
            .field("meta", &self.meta)
            .field("customizations", &self.customizations)
            .finish()
    }
}

impl SessionRequest {
    /// Create a request with only the required fields set
    pub fn new(
        authorization: impl Into<String>,
        tx_ref: impl Into<String>,
        amount: Decimal,
        currency: Currency,
        email: impl Into<String>,
    ) -> Self {
        Self {
            authorization: authorization.into(),
            tx_ref: tx_ref.into(),
            amount,
            currency,
            customer: Customer {
                email: email.into(),
                name: None,
                phonenumber: None,
            },
            integrity_hash: None,
            payment_options: Vec::new(),
            payment_plan: None,
            subaccounts: Vec::new(),
            meta: Vec::new(),
            customizations: None,
        }
    }

    #[must_use]
    pub fn with_tx_ref(mut self, tx_ref: impl Into<String>) -> Self {
        self.tx_ref = tx_ref.into();
        self
    }

    #[must_use]
    pub fn with_payment_options(mut self, options: Vec<PaymentOption>) -> Self {
        self.payment_options = options;
        self
    }

    #[must_use]
    pub fn with_customizations(mut self, customizations: Customizations) -> Self {
        self.customizations = Some(customizations);
        self
    }

    /// Deep structural comparison; any field difference counts as a change
    pub fn differs_from(&self, other: &Self) -> bool {
        self != other
    }

    /// Check the required fields before anything goes over the wire
    pub fn validate(&self) -> Result<()> {
        if self.authorization.trim().is_empty() {
            return Err(CheckoutError::InvalidRequest("authorization is required".into()));
        }
        if self.tx_ref.trim().is_empty() {
            return Err(CheckoutError::InvalidRequest("tx_ref is required".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(CheckoutError::InvalidRequest(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        let email = self.customer.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(CheckoutError::InvalidRequest(
                "customer email is required".into(),
            ));
        }
        Ok(())
    }

    /// Attach the fixed redirect endpoint, producing the wire payload
    pub fn prepare(&self, redirect: &RedirectEndpoint) -> PreparedRequest {
        PreparedRequest {
            request: self.clone(),
            redirect_url: redirect.url().clone(),
        }
    }
}

/// A [`SessionRequest`] with the system redirect endpoint injected
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreparedRequest {
    #[serde(flatten)]
    request: SessionRequest,

    redirect_url: Url,
}

impl PreparedRequest {
    pub fn request(&self) -> &SessionRequest {
        &self.request
    }

    pub fn authorization(&self) -> &str {
        &self.request.authorization
    }

    pub fn tx_ref(&self) -> &str {
        &self.request.tx_ref
    }

    pub const fn redirect_url(&self) -> &Url {
        &self.redirect_url
    }
}
