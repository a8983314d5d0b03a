//! Ledger sink implementation.

use async_trait::async_trait;

use cpgw_core::ledger::LedgerSink;
use cpgw_core::transaction::TransactionResult;

/// Ledger that emits verified transactions as structured log records.
///
/// The billing platform consuming this server is expected to tail these
/// records (or replace this sink) to reconcile invoices; deduplication by
/// `transaction_id` happens on the consuming side.
pub struct TracingLedger;

#[async_trait]
impl LedgerSink for TracingLedger {
    async fn record(&self, transaction: TransactionResult) {
        tracing::info!(
            client_id = %transaction.client_id,
            transaction_id = %transaction.transaction_id,
            status = %transaction.status,
            amount = %transaction.amount,
            currency = %transaction.currency,
            invoices = transaction.invoice_amounts.len(),
            "Recorded payment transaction"
        );
    }
}
