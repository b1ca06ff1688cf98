// Contact form relay: forwards the submitted JSON body verbatim to the configured form endpoint

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Form endpoint rejected submission ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait FormRelay: Send + Sync {
    async fn forward(&self, body: Bytes) -> Result<(), RelayError>;
}

#[derive(Clone)]
pub struct HttpFormRelay {
    client: Client,
    endpoint: String,
}

impl HttpFormRelay {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl FormRelay for HttpFormRelay {
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    async fn forward(&self, body: Bytes) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Contact form forwarded");
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(
            "Form endpoint rejected submission. Status: {}, Error: {}",
            status, error_text
        );

        Err(RelayError::Rejected {
            status: status.as_u16(),
            message: "Failed to submit form".to_string(),
        })
    }
}
