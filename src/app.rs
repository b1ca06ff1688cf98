// Application state and router
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    app_config::AppConfig,
    handlers,
    middleware::cors_middleware,
    services::{
        AuthCallbackService, FormRelay, HttpFormRelay, IdentityBackend, PaymentGateway,
        PaymentVerificationService, PaystackClient, ProfileStore, SupabaseClient,
    },
    utils::ServiceError,
};

// Application state shared across handlers
// Integrations are optional: a request that needs a missing one gets a 500 configuration error
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub profile_store: Option<Arc<dyn ProfileStore>>,
    pub identity: Option<Arc<dyn IdentityBackend>>,
    pub payment_gateway: Option<Arc<dyn PaymentGateway>>,
    pub form_relay: Option<Arc<dyn FormRelay>>,
}

impl AppState {
    /// Build the HTTP clients for every integration that has configuration
    pub fn from_config(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.http_client_timeout_secs);

        let supabase = match (&config.supabase.url, &config.supabase.service_role_key) {
            (Some(url), Some(key)) => Some(Arc::new(SupabaseClient::new(
                url.as_str(),
                key.as_str(),
                config.supabase.anon_key.clone(),
                timeout,
            )?)),
            _ => {
                warn!("SUPABASE_URL / SUPABASE_SERVICE_ROLE_KEY not set; auth and payment routes will fail");
                None
            },
        };

        let payment_gateway: Option<Arc<dyn PaymentGateway>> = match &config.paystack.secret_key {
            Some(secret) => Some(Arc::new(PaystackClient::new(
                config.paystack.base_url.as_str(),
                secret.as_str(),
                timeout,
            )?)),
            None => {
                warn!("PAYSTACK_SECRET_KEY not set; payment verification will fail");
                None
            },
        };

        let form_relay: Option<Arc<dyn FormRelay>> = match &config.contact.form_endpoint_url {
            Some(endpoint) => Some(Arc::new(HttpFormRelay::new(endpoint.as_str(), timeout)?)),
            None => {
                warn!("FORM_ENDPOINT_URL not set; contact relay will fail");
                None
            },
        };

        info!(
            "Integrations: supabase={}, paystack={}, contact={}",
            supabase.is_some(),
            payment_gateway.is_some(),
            form_relay.is_some()
        );

        Ok(Self {
            config,
            profile_store: supabase.clone().map(|c| c as Arc<dyn ProfileStore>),
            identity: supabase.map(|c| c as Arc<dyn IdentityBackend>),
            payment_gateway,
            form_relay,
        })
    }

    pub fn require_profile_store(&self) -> Result<Arc<dyn ProfileStore>, ServiceError> {
        self.profile_store.clone().ok_or_else(|| {
            ServiceError::Configuration("Supabase URL or service key is not configured".to_string())
        })
    }

    pub fn require_identity(&self) -> Result<Arc<dyn IdentityBackend>, ServiceError> {
        self.identity.clone().ok_or_else(|| {
            ServiceError::Configuration("Supabase auth is not configured".to_string())
        })
    }

    pub fn require_payment_gateway(&self) -> Result<Arc<dyn PaymentGateway>, ServiceError> {
        self.payment_gateway.clone().ok_or_else(|| {
            ServiceError::Configuration("Paystack secret key is not configured".to_string())
        })
    }

    pub fn require_form_relay(&self) -> Result<Arc<dyn FormRelay>, ServiceError> {
        self.form_relay.clone().ok_or_else(|| {
            ServiceError::Configuration("Form endpoint URL is not configured".to_string())
        })
    }

    pub fn payment_verification_service(&self) -> Result<PaymentVerificationService, ServiceError> {
        Ok(PaymentVerificationService::new(
            self.require_payment_gateway()?,
            self.require_profile_store()?,
        ))
    }

    pub fn auth_callback_service(&self) -> Result<AuthCallbackService, ServiceError> {
        Ok(AuthCallbackService::new(
            self.require_profile_store()?,
            self.require_identity()?,
        ))
    }
}

/// Edge-function style routes (contact relay, payment verification, gateway webhook)
pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", post(handlers::contact::relay_contact_form))
        .route("/paystack-verify", post(handlers::payments::verify_payment))
        .route("/paystack-webhook", post(handlers::payments::paystack_webhook))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/google", get(handlers::auth::start_google_sign_in))
        .route("/callback", get(handlers::auth::oauth_callback))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/auth", auth_routes())
        .nest("/functions", function_routes())
        .layer(from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
