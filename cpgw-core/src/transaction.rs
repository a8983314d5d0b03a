//! Normalized transaction records handed to the billing ledger.

use serde::{Deserialize, Serialize};

use cpgw_sdk::objects::invoice::InvoiceAllocation;
use cpgw_sdk::objects::webhook::{CANCELLED_EVENT, PAID_EVENT};

/// Internal transaction status of the billing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Approved,
    Declined,
    Pending,
}

impl TransactionStatus {
    /// Map a processor invoice status to the internal status: `Paid` is
    /// approved, `Cancelled` is declined, anything else stays pending.
    pub fn from_event(status: &str) -> Self {
        match status {
            PAID_EVENT => TransactionStatus::Approved,
            CANCELLED_EVENT => TransactionStatus::Declined,
            _ => TransactionStatus::Pending,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Approved => write!(f, "approved"),
            TransactionStatus::Declined => write!(f, "declined"),
            TransactionStatus::Pending => write!(f, "pending"),
        }
    }
}

/// A verified payment notification, normalized for the billing ledger.
///
/// Idempotent handling of duplicate deliveries (same `transaction_id`) is
/// the ledger's responsibility, not the gateway's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Local billing client id recovered from the composite invoice id.
    pub client_id: String,
    /// Display amount as reported by the processor.
    pub amount: String,
    /// Currency symbol as reported by the processor.
    pub currency: String,
    pub status: TransactionStatus,
    pub reference_id: Option<String>,
    /// The processor's opaque invoice id.
    pub transaction_id: String,
    pub parent_transaction_id: String,
    /// Per-invoice allocations recovered from the invoice's custom data.
    pub invoice_amounts: Vec<InvoiceAllocation>,
    /// Extra message for the operator, set on unsupported operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Refunds are not supported by the processor; every attempt comes back
/// declined with an explanatory message instead of failing hard.
pub fn refund_unsupported(transaction_id: &str) -> TransactionResult {
    TransactionResult {
        client_id: String::new(),
        amount: String::new(),
        currency: String::new(),
        status: TransactionStatus::Declined,
        reference_id: None,
        transaction_id: transaction_id.to_owned(),
        parent_transaction_id: String::new(),
        invoice_amounts: Vec::new(),
        message: Some("CoinPayments does not support refunds.".to_owned()),
    }
}

/// Status reported on the return-URL path. The synchronous return from
/// checkout carries no verified payment state, so it is always pending;
/// webhook notifications deliver the real outcome.
pub fn return_url_status() -> TransactionStatus {
    TransactionStatus::Pending
}
