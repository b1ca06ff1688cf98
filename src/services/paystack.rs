// Payment gateway client: transaction verification and webhook event payloads

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum PaystackError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Paystack returned status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// `{status, message, data}` wrapper used by every Paystack endpoint
#[derive(Debug, Deserialize)]
pub struct PaystackEnvelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionData {
    pub id: i64,
    pub status: String,
    pub reference: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    /// Paystack sends `""` when no metadata was attached, so keep it untyped
    #[serde(default)]
    pub metadata: JsonValue,
    #[serde(default)]
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub email: Option<String>,
}

/// Push event delivered to the webhook endpoint.
/// `data` differs per event type, so it stays untyped until the event is known.
#[derive(Debug, Deserialize)]
pub struct PaystackEvent {
    pub event: String,
    #[serde(default)]
    pub data: JsonValue,
}

pub const CHARGE_SUCCESS_EVENT: &str = "charge.success";

impl PaystackEvent {
    /// The charge carried by a `charge.success` event; `None` for every other event
    pub fn successful_charge(&self) -> Result<Option<TransactionData>, serde_json::Error> {
        if self.event != CHARGE_SUCCESS_EVENT {
            return Ok(None);
        }

        let data: TransactionData = serde_json::from_value(self.data.clone())?;
        Ok(data.is_successful().then_some(data))
    }
}

// =============================================================================
// DOMAIN TYPES
// =============================================================================

/// A charge the gateway confirmed as successful
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCharge {
    pub transaction_id: i64,
    pub reference: String,
    pub amount: i64,
    pub customer_email: Option<String>,
    pub plan: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayVerdict {
    Success(VerifiedCharge),
    /// Anything other than a successful charge; carries the gateway's own wording
    Declined {
        message: String,
        status: Option<String>,
    },
}

impl TransactionData {
    pub fn is_successful(&self) -> bool {
        self.status == "success"
    }

    pub fn plan(&self) -> Option<String> {
        self.metadata
            .get("plan")
            .and_then(|plan| plan.as_str())
            .map(str::trim)
            .filter(|plan| !plan.is_empty())
            .map(String::from)
    }
}

impl From<TransactionData> for VerifiedCharge {
    fn from(data: TransactionData) -> Self {
        let plan = data.plan();
        Self {
            transaction_id: data.id,
            reference: data.reference,
            amount: data.amount,
            customer_email: data.customer.and_then(|c| c.email),
            plan,
        }
    }
}

impl From<PaystackEnvelope<TransactionData>> for GatewayVerdict {
    fn from(envelope: PaystackEnvelope<TransactionData>) -> Self {
        match envelope.data {
            Some(data) if envelope.status && data.is_successful() => {
                GatewayVerdict::Success(data.into())
            },
            Some(data) if envelope.status => GatewayVerdict::Declined {
                message: data
                    .gateway_response
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| format!("Payment {}", data.status)),
                status: Some(data.status),
            },
            _ => GatewayVerdict::Declined {
                message: if envelope.message.is_empty() {
                    "Payment verification failed".to_string()
                } else {
                    envelope.message
                },
                status: None,
            },
        }
    }
}

// =============================================================================
// SEAM + CLIENT
// =============================================================================

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn verify_transaction(&self, reference: &str) -> Result<GatewayVerdict, PaystackError>;
}

#[derive(Clone)]
pub struct PaystackClient {
    client: Client,
    base_url: Url,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PaystackError> {
        let base_url = Url::parse(&base_url.into())?;
        if base_url.cannot_be_a_base() {
            return Err(PaystackError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
            secret_key: secret_key.into(),
        })
    }

    /// `{base}/transaction/verify/{reference}` with the reference escaped as one path segment
    fn verify_url(&self, reference: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["transaction", "verify", reference]);
        }
        url
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    #[instrument(skip(self))]
    async fn verify_transaction(&self, reference: &str) -> Result<GatewayVerdict, PaystackError> {
        let response = self
            .client
            .get(self.verify_url(reference))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // Paystack answers 4xx with the same JSON envelope (e.g. unknown reference)
        match serde_json::from_str::<PaystackEnvelope<TransactionData>>(&text) {
            Ok(envelope) => {
                info!(
                    "Paystack verification answered: http_status={}, status={}, message={}",
                    status, envelope.status, envelope.message
                );
                Ok(envelope.into())
            },
            Err(e) if status.is_success() => {
                error!("Could not decode Paystack verification body: {}", e);
                Err(PaystackError::Decode(e.to_string()))
            },
            Err(_) => {
                error!("Paystack verification failed. Status: {}, Body: {}", status, text);
                Err(PaystackError::Http {
                    status: status.as_u16(),
                    message: "Payment gateway error".to_string(),
                })
            },
        }
    }
}
