// Payment verification: confirm a checkout reference with the gateway, then record it
//
// Both writes are plain assignments, so re-verifying the same reference re-applies the same
// state. There is no locking or idempotency key around them.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::models::{normalize_email, AccessGrant, TransactionCompletion};
use crate::services::paystack::{GatewayVerdict, PaymentGateway, VerifiedCharge};
use crate::services::supabase::ProfileStore;
use crate::utils::service_error::ServiceError;

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Completed {
        reference: String,
        plan: Option<String>,
    },
    Declined {
        message: String,
        status: Option<String>,
    },
}

/// What happened to each write after a successful charge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionReport {
    pub transaction_updated: bool,
    pub access_granted: bool,
}

#[derive(Clone)]
pub struct PaymentVerificationService {
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn ProfileStore>,
}

impl PaymentVerificationService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, store: Arc<dyn ProfileStore>) -> Self {
        Self { gateway, store }
    }

    /// Verify `reference` with the gateway and, on success, complete the transaction and grant access
    #[instrument(skip(self))]
    pub async fn verify(
        &self,
        reference: &str,
        user_email: Option<&str>,
    ) -> Result<VerificationOutcome, ServiceError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ServiceError::MissingInput(
                "Transaction reference is required".to_string(),
            ));
        }

        let verdict = self.gateway.verify_transaction(reference).await.map_err(|e| {
            error!("Payment gateway verification failed for {}: {}", reference, e);
            ServiceError::from(e)
        })?;

        match verdict {
            GatewayVerdict::Declined { message, status } => {
                warn!(
                    "Payment {} not successful: status={:?}, message={}",
                    reference, status, message
                );
                Ok(VerificationOutcome::Declined { message, status })
            },
            GatewayVerdict::Success(charge) => {
                self.record_completion(&charge, user_email).await;
                Ok(VerificationOutcome::Completed {
                    reference: charge.reference,
                    plan: charge.plan,
                })
            },
        }
    }

    /// Apply the post-payment writes. Failures are logged only: the charge itself already succeeded.
    #[instrument(skip(self, charge), fields(reference = %charge.reference))]
    pub async fn record_completion(
        &self,
        charge: &VerifiedCharge,
        user_email: Option<&str>,
    ) -> CompletionReport {
        let mut report = CompletionReport::default();

        let completion = TransactionCompletion::new(&charge.reference, charge.transaction_id);
        match self.store.complete_transaction(&completion).await {
            Ok(()) => {
                report.transaction_updated = true;
                info!(
                    "Transaction {} marked completed (amount: {})",
                    charge.reference, charge.amount
                );
            },
            Err(e) => error!("Failed to update transaction {}: {}", charge.reference, e),
        }

        // Caller-supplied email wins; the gateway's customer email is the fallback
        let email = user_email
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .or_else(|| charge.customer_email.as_deref().map(normalize_email))
            .filter(|e| !e.is_empty());

        let Some(email) = email else {
            warn!(
                "No email available for {}; profile access not updated",
                charge.reference
            );
            return report;
        };

        let grant = AccessGrant::with_plan(charge.plan.clone());
        match self.store.grant_access(&email, &grant).await {
            Ok(()) => {
                report.access_granted = true;
                info!("Granted course access to {} (plan: {:?})", email, charge.plan);
            },
            Err(e) => error!("Error updating profile for {}: {}", email, e),
        }

        report
    }
}
