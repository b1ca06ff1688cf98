use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of a `payment_transactions` row, keyed by checkout reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

/// Patch that moves a transaction to `completed`
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCompletion {
    pub reference: String,
    pub paystack_transaction_id: String,
    pub completed_at: DateTime<Utc>,
}

impl TransactionCompletion {
    pub fn new(reference: impl Into<String>, paystack_transaction_id: impl ToString) -> Self {
        Self {
            reference: reference.into(),
            paystack_transaction_id: paystack_transaction_id.to_string(),
            completed_at: Utc::now(),
        }
    }

    /// PostgREST PATCH body
    pub fn as_update(&self) -> TransactionUpdate<'_> {
        TransactionUpdate {
            status: TransactionStatus::Completed.as_str(),
            paystack_transaction_id: &self.paystack_transaction_id,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionUpdate<'a> {
    pub status: &'static str,
    pub paystack_transaction_id: &'a str,
    pub completed_at: DateTime<Utc>,
}
