// Payment handlers
// POST /functions/paystack-verify  - client-initiated verification after checkout
// POST /functions/paystack-webhook - signed push events from the gateway

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    app::AppState,
    services::{paystack::PaystackEvent, VerificationOutcome, VerifiedCharge},
    utils::{verify_signature, ServiceError},
};

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl VerifyPaymentResponse {
    fn failure(message: impl Into<String>, status: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            plan: None,
            status,
        }
    }
}

/// Errors on this route keep the `{success:false, message}` body shape
fn failure_response(error: ServiceError) -> Response {
    let status = error.status_code();
    (
        status,
        Json(VerifyPaymentResponse::failure(error.public_message(), None)),
    )
        .into_response()
}

// =============================================================================
// HANDLERS
// =============================================================================

/// POST /functions/paystack-verify
pub async fn verify_payment(State(app_state): State<AppState>, body: Bytes) -> Response {
    let request: VerifyPaymentRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Invalid verification request body: {}", e);
            return failure_response(ServiceError::MissingInput(
                "Request body must be JSON with a transaction reference".to_string(),
            ));
        },
    };

    let Some(reference) = request
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
    else {
        return failure_response(ServiceError::MissingInput(
            "Transaction reference is required".to_string(),
        ));
    };

    let service = match app_state.payment_verification_service() {
        Ok(service) => service,
        Err(e) => {
            error!("Payment verification unavailable: {}", e);
            return failure_response(e);
        },
    };

    match service.verify(reference, request.user_email.as_deref()).await {
        Ok(VerificationOutcome::Completed { reference, plan }) => {
            info!("Payment {} verified", reference);
            (
                StatusCode::OK,
                Json(VerifyPaymentResponse {
                    success: true,
                    message: "Payment verified successfully".to_string(),
                    plan,
                    status: None,
                }),
            )
                .into_response()
        },
        Ok(VerificationOutcome::Declined { message, status }) => (
            StatusCode::BAD_REQUEST,
            Json(VerifyPaymentResponse::failure(message, status)),
        )
            .into_response(),
        Err(e) => failure_response(e),
    }
}

/// POST /functions/paystack-webhook
pub async fn paystack_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(secret) = app_state.config.paystack.secret_key.as_deref() else {
        error!("Webhook received but PAYSTACK_SECRET_KEY is not configured");
        return ServiceError::Configuration("Paystack secret key is not configured".to_string())
            .into_response();
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !verify_signature(secret, &body, signature) {
        warn!("Rejected webhook with invalid signature");
        return ServiceError::Unauthorized.into_response();
    }

    let event: PaystackEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Unparseable webhook payload: {}", e);
            return ServiceError::MissingInput("Invalid event payload".to_string()).into_response();
        },
    };

    let data = match event.successful_charge() {
        Ok(Some(data)) => data,
        Ok(None) => {
            info!("Ignoring webhook event {}", event.event);
            return (StatusCode::OK, Json(serde_json::json!({ "received": true }))).into_response();
        },
        Err(e) => {
            warn!("Unparseable {} data: {}", event.event, e);
            return ServiceError::MissingInput("Invalid event payload".to_string()).into_response();
        },
    };

    let service = match app_state.payment_verification_service() {
        Ok(service) => service,
        Err(e) => {
            error!("Webhook cannot be processed: {}", e);
            return e.into_response();
        },
    };

    let charge = VerifiedCharge::from(data);
    let report = service.record_completion(&charge, None).await;
    info!(
        "Webhook charge {} processed: transaction_updated={}, access_granted={}",
        charge.reference, report.transaction_updated, report.access_granted
    );

    (StatusCode::OK, Json(serde_json::json!({ "received": true }))).into_response()
}
