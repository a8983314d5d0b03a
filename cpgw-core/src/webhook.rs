//! Inbound webhook verification and transaction mapping.
//!
//! This is the trust boundary of the gateway: the only code path that turns
//! an untrusted network payload into a financial state change. The signature
//! check runs before any business meaning is derived from the payload, and a
//! rejected notification produces nothing — no transaction, no detail in the
//! response — so the endpoint cannot be used as a verification oracle.

use std::sync::Arc;

use crate::config::{split_composite_id, GatewayConfig};
use crate::error::GatewayError;
use crate::transaction::{TransactionResult, TransactionStatus};
use cpgw_sdk::client::ApiClient;
use cpgw_sdk::objects::webhook::WebhookNotification;
use cpgw_sdk::signature;

/// A notification that passed signature and fingerprint checks.
#[derive(Debug, Clone)]
pub struct AcceptedNotification {
    /// Local billing client id recovered from the composite invoice id.
    pub local_client_id: String,
    /// The processor's opaque invoice id.
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub amount: String,
    pub currency: String,
}

/// Check an inbound notification without touching the network.
///
/// Returns `None` on any rejection: bad or missing signature, unparsable
/// body, absent composite invoice id, or a host fingerprint that does not
/// belong to this installation. Rejection reasons are logged at debug level
/// only.
pub fn authenticate_notification(
    config: &GatewayConfig,
    signature_header: &str,
    raw_body: &[u8],
) -> Option<AcceptedNotification> {
    let secret = config.credentials.webhook_secret()?;

    // Parsing happens before verification only to recover the event name
    // that is part of the signed notification URL; nothing from the payload
    // is trusted until the signature holds.
    let notification: WebhookNotification = match serde_json::from_slice(raw_body) {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(error = %e, "Webhook rejected: unparsable body");
            return None;
        }
    };

    let notification_url = config.notification_url(&notification.invoice.status);
    let message = signature::webhook_message(&notification_url, raw_body);
    if !signature::verify_signature(signature_header, &message, secret) {
        tracing::debug!("Webhook rejected: signature mismatch");
        return None;
    }

    let Some(composite) = notification.invoice.invoice_id.as_deref() else {
        tracing::debug!("Webhook rejected: no composite invoice id");
        return None;
    };
    let Some((host_hash, local_client_id)) = split_composite_id(composite) else {
        tracing::debug!("Webhook rejected: malformed composite invoice id");
        return None;
    };
    if host_hash != config.host_fingerprint() {
        tracing::debug!("Webhook rejected: host fingerprint mismatch");
        return None;
    }

    Some(AcceptedNotification {
        local_client_id: local_client_id.to_owned(),
        transaction_id: notification.invoice.id.clone(),
        status: TransactionStatus::from_event(&notification.invoice.status),
        amount: notification
            .invoice
            .amount
            .as_ref()
            .and_then(|a| a.display_value)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        currency: notification
            .invoice
            .currency
            .as_ref()
            .and_then(|c| c.symbol.clone())
            .unwrap_or_default(),
    })
}

/// Validates inbound webhook notifications and maps them to transactions.
pub struct WebhookValidator {
    api: ApiClient,
    config: Arc<GatewayConfig>,
}

impl WebhookValidator {
    pub fn new(api: ApiClient, config: Arc<GatewayConfig>) -> Self {
        Self { api, config }
    }

    /// Validate a notification and, when it is authentic and meant for this
    /// installation, emit the normalized transaction.
    ///
    /// `Ok(None)` covers every rejection, including webhook mode being
    /// disabled — the webhook path is unreachable then, and non-webhook
    /// installations rely solely on the return-URL path. `Err` is reserved
    /// for the follow-up invoice-detail fetch failing.
    pub async fn validate(
        &self,
        signature_header: Option<&str>,
        raw_body: &[u8],
    ) -> Result<Option<TransactionResult>, GatewayError> {
        let Some(secret) = self.config.credentials.webhook_secret() else {
            return Ok(None);
        };
        let Some(signature_header) = signature_header else {
            tracing::debug!("Webhook rejected: missing signature header");
            return Ok(None);
        };

        let Some(accepted) = authenticate_notification(&self.config, signature_header, raw_body)
        else {
            return Ok(None);
        };

        // Only now, with authenticity established, is it safe to call out
        // for the per-invoice allocations stored on the invoice.
        let detail = self
            .api
            .get_invoice(
                &accepted.transaction_id,
                &self.config.credentials.client_id,
                Some(secret),
            )
            .await?;

        tracing::info!(
            transaction_id = %accepted.transaction_id,
            client_id = %accepted.local_client_id,
            status = %accepted.status,
            "Webhook notification verified"
        );

        Ok(Some(TransactionResult {
            client_id: accepted.local_client_id,
            amount: accepted.amount,
            currency: accepted.currency,
            status: accepted.status,
            reference_id: None,
            transaction_id: accepted.transaction_id,
            parent_transaction_id: String::new(),
            invoice_amounts: detail.parsed_allocations(),
            message: None,
        }))
    }
}
