// Services module for the course portal backend
// External clients sit behind traits; the flows only see the traits

pub mod auth_callback;
pub mod form_relay;
pub mod payment_verification;
pub mod paystack;
pub mod supabase;

// Re-export commonly used services
pub use auth_callback::{reconcile, AuthCallbackService, CallbackOutcome, Destination, Notice, NoticeKind};
pub use form_relay::{FormRelay, HttpFormRelay, RelayError};
pub use payment_verification::{CompletionReport, PaymentVerificationService, VerificationOutcome};
pub use paystack::{GatewayVerdict, PaymentGateway, PaystackClient, PaystackError, VerifiedCharge};
pub use supabase::{IdentityBackend, ProfileStore, SupabaseClient, SupabaseError};
