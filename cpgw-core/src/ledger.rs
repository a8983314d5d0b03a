//! Collaborator contract produced by the gateway: verified transactions are
//! handed to the billing ledger for invoice reconciliation.

use async_trait::async_trait;

use crate::transaction::TransactionResult;

/// Receiver of normalized transaction records.
///
/// The ledger owns idempotency: two webhook deliveries for the same invoice
/// both verify independently and both arrive here with the same
/// `transaction_id`.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    async fn record(&self, transaction: TransactionResult);
}
