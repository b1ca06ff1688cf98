use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;

/// GET /health - liveness plus which integrations are configured (never their secrets)
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "integrations": {
            "supabase": state.profile_store.is_some(),
            "paystack": state.payment_gateway.is_some(),
            "contact_relay": state.form_relay.is_some()
        }
    });

    (StatusCode::OK, Json(response))
}
