// POST /functions/contact - relay the contact form body to the configured form endpoint

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::{app::AppState, utils::ServiceError};

pub async fn relay_contact_form(State(app_state): State<AppState>, body: Bytes) -> Response {
    let relay = match app_state.require_form_relay() {
        Ok(relay) => relay,
        Err(e) => {
            error!("Contact relay unavailable: {}", e);
            return e.into_response();
        },
    };

    match relay.forward(body).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            error!("Contact form relay failed: {}", e);
            ServiceError::from(e).into_response()
        },
    }
}
