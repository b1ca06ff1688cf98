// HTTP-facing error type shared by the function handlers
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{form_relay::RelayError, paystack::PaystackError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    InternalError,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::MissingInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            },
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Configuration(msg) => msg.clone(),
            ServiceError::MissingInput(msg) => msg.clone(),
            ServiceError::Upstream { message, .. } => message.clone(),
            ServiceError::Unauthorized => "Unauthorized".to_string(),
            ServiceError::InternalError => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.public_message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Client errors surface as upstream failures when the remote answered, otherwise as internal errors
impl From<PaystackError> for ServiceError {
    fn from(error: PaystackError) -> Self {
        match error {
            PaystackError::Http { status, message } => ServiceError::Upstream { status, message },
            _ => ServiceError::InternalError,
        }
    }
}

impl From<RelayError> for ServiceError {
    fn from(error: RelayError) -> Self {
        match error {
            RelayError::Rejected { status, message } => ServiceError::Upstream { status, message },
            RelayError::Network(_) => ServiceError::InternalError,
        }
    }
}
