//! Webhook registration objects and the inbound notification payload.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice status event delivered when a payment completes.
pub const PAID_EVENT: &str = "Paid";

/// Invoice status event delivered when a payment is cancelled.
pub const CANCELLED_EVENT: &str = "Cancelled";

/// Notification subscription name for an invoice status event
/// (`"Paid"` → `"invoicePaid"`).
pub fn invoice_notification(event: &str) -> String {
    format!("invoice{event}")
}

/// Body of `POST merchant/clients/{client_id}/webhooks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRegistration {
    pub notifications_url: String,
    pub notifications: Vec<String>,
}

/// A registered webhook as returned by the processor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookInfo {
    #[serde(default)]
    pub id: Option<String>,
    pub notifications_url: String,
    #[serde(default)]
    pub notifications: Vec<String>,
}

/// Listing of the webhooks registered for a client.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookList {
    #[serde(default)]
    pub items: Vec<WebhookInfo>,
}

impl WebhookList {
    /// The notification URLs currently registered.
    pub fn notification_urls(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|w| w.notifications_url.as_str())
            .collect()
    }
}

/// Inbound webhook notification body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookNotification {
    pub invoice: NotificationInvoice,
}

/// The invoice block of an inbound notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInvoice {
    /// The processor's opaque invoice id (our transaction id).
    pub id: String,
    /// The caller-supplied composite invoice id, absent on notifications
    /// that do not concern one of our invoices.
    #[serde(default)]
    pub invoice_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub amount: Option<NotificationAmount>,
    #[serde(default)]
    pub currency: Option<NotificationCurrency>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAmount {
    #[serde(default)]
    pub display_value: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationCurrency {
    #[serde(default)]
    pub symbol: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_parses_nested_invoice() {
        let raw = r#"{
            "invoice": {
                "id": "inv-900",
                "invoiceId": "deadbeef|42",
                "status": "Paid",
                "amount": {"displayValue": "25.00"},
                "currency": {"symbol": "USD"}
            }
        }"#;
        let notification: WebhookNotification = serde_json::from_str(raw).unwrap();
        assert_eq!(notification.invoice.id, "inv-900");
        assert_eq!(notification.invoice.invoice_id.as_deref(), Some("deadbeef|42"));
        assert_eq!(notification.invoice.status, "Paid");
    }

    #[test]
    fn notification_tolerates_missing_optional_fields() {
        let raw = r#"{"invoice": {"id": "inv-1", "status": "Pending"}}"#;
        let notification: WebhookNotification = serde_json::from_str(raw).unwrap();
        assert!(notification.invoice.invoice_id.is_none());
        assert!(notification.invoice.amount.is_none());
    }

    #[test]
    fn invoice_notification_names() {
        assert_eq!(invoice_notification(PAID_EVENT), "invoicePaid");
        assert_eq!(invoice_notification(CANCELLED_EVENT), "invoiceCancelled");
    }
}
