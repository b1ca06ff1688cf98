// Utility modules for the course portal backend

pub mod pkce;
pub mod service_error;
pub mod signature;

pub use pkce::{compute_code_challenge, generate_code_verifier};
pub use service_error::ServiceError;
pub use signature::verify_signature;
