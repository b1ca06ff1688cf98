// Library exports for the course portal backend
// OAuth callback reconciliation, payment verification and the contact relay over Supabase + Paystack

pub mod app;
pub mod app_config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::{build_router, AppState};
pub use app_config::AppConfig;
pub use models::{AuthProvider, AuthSession, Profile, SessionUser};
pub use services::{
    reconcile, AuthCallbackService, CallbackOutcome, Destination, FormRelay, IdentityBackend,
    PaymentGateway, PaymentVerificationService, ProfileStore, VerificationOutcome,
};
pub use utils::ServiceError;

/// Build application state from an already loaded configuration
pub fn initialize_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    AppState::from_config(std::sync::Arc::new(config))
}
