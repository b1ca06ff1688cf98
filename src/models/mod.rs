pub mod payment;
pub mod profile;
pub mod session;

// Re-export common types
pub use payment::{TransactionCompletion, TransactionStatus};
pub use profile::{normalize_email, AccessGrant, AuthProvider, Profile};
pub use session::{AppMetadata, AuthSession, SessionUser};
