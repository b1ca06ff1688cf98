// OAuth sign-in handlers
// GET /auth/google   - start the hosted Google sign-in (PKCE)
// GET /auth/callback - exchange the code, reconcile against `profiles`, redirect to the front end

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;
use tracing::{error, warn};

use crate::{
    app::AppState,
    app_config::AppConfig,
    models::AuthProvider,
    services::auth_callback::{CallbackOutcome, AUTHENTICATION_FAILED},
    utils::{compute_code_challenge, generate_code_verifier, ServiceError},
};

pub const PKCE_COOKIE: &str = "pkce_verifier";
const PKCE_COOKIE_PATH: &str = "/auth";
const PKCE_COOKIE_TTL_MINUTES: i64 = 10;

/// Consent parameters passed through to Google so a refresh token is always issued
const GOOGLE_CONSENT_PARAMS: &[(&str, &str)] = &[("access_type", "offline"), ("prompt", "consent")];

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn verifier_cookie(verifier: String, config: &AppConfig) -> Cookie<'static> {
    // Lax: the cookie has to survive the cross-site redirect back from the provider
    Cookie::build((PKCE_COOKIE, verifier))
        .path(PKCE_COOKIE_PATH)
        .http_only(true)
        .secure(config.is_production())
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(PKCE_COOKIE_TTL_MINUTES))
        .build()
}

fn expired_verifier_cookie() -> Cookie<'static> {
    Cookie::build((PKCE_COOKIE, "")).path(PKCE_COOKIE_PATH).build()
}

/// GET /auth/google
pub async fn start_google_sign_in(State(app_state): State<AppState>, jar: CookieJar) -> Response {
    let identity = match app_state.require_identity() {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    let verifier = generate_code_verifier();
    let challenge = compute_code_challenge(&verifier);

    match identity.authorize_url(
        AuthProvider::Google,
        &app_state.config.auth_callback_url,
        &challenge,
        GOOGLE_CONSENT_PARAMS,
    ) {
        Ok(url) => (
            jar.add(verifier_cookie(verifier, &app_state.config)),
            Redirect::to(&url),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to build authorize URL: {}", e);
            ServiceError::Configuration("Supabase URL is invalid".to_string()).into_response()
        },
    }
}

/// GET /auth/callback
pub async fn oauth_callback(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    let verifier = jar.get(PKCE_COOKIE).map(|c| c.value().to_string());
    let outcome = resolve_callback(&app_state, params, verifier).await;

    match outcome.redirect_url(&app_state.config.site_url) {
        Ok(url) => (jar.remove(expired_verifier_cookie()), Redirect::to(&url)).into_response(),
        Err(e) => {
            error!("SITE_URL cannot be used as redirect base: {}", e);
            ServiceError::Configuration("Site URL is invalid".to_string()).into_response()
        },
    }
}

async fn resolve_callback(
    app_state: &AppState,
    params: CallbackParams,
    verifier: Option<String>,
) -> CallbackOutcome {
    if let Some(provider_error) = params.error {
        warn!(
            "Identity provider returned error: {} ({:?})",
            provider_error, params.error_description
        );
        return CallbackOutcome::authentication_failed(
            params
                .error_description
                .unwrap_or_else(|| AUTHENTICATION_FAILED.to_string()),
        );
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        warn!("OAuth callback without authorization code");
        return CallbackOutcome::authentication_failed(AUTHENTICATION_FAILED);
    };

    let Some(verifier) = verifier.filter(|v| !v.is_empty()) else {
        warn!("OAuth callback without PKCE verifier cookie");
        return CallbackOutcome::authentication_failed(AUTHENTICATION_FAILED);
    };

    let service = match app_state.auth_callback_service() {
        Ok(service) => service,
        Err(e) => {
            error!("OAuth callback cannot run: {}", e);
            return CallbackOutcome::authentication_failed(AUTHENTICATION_FAILED);
        },
    };

    let identity = match app_state.require_identity() {
        Ok(identity) => identity,
        Err(e) => {
            error!("OAuth callback cannot run: {}", e);
            return CallbackOutcome::authentication_failed(AUTHENTICATION_FAILED);
        },
    };

    let session = match identity.exchange_code(&code, &verifier).await {
        Ok(session) => session,
        Err(e) => {
            error!("Authorization code exchange failed: {}", e);
            return CallbackOutcome::authentication_failed(AUTHENTICATION_FAILED);
        },
    };

    service.handle(&session).await
}
