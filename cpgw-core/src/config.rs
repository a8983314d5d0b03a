//! Gateway configuration and credential handling.
//!
//! Everything the original integration read from ambient globals (callback
//! host, company id, store name, product version) is an explicit value here,
//! injected into the orchestrator and validator at construction.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use cpgw_sdk::objects::invoice::InvoiceMetadata;

/// Path segment of the webhook callback endpoint, appended after the
/// company id.
pub const NOTIFICATION_PATH: &str = "/coin_payments/";

/// Separator of the composite invoice id (`host_fingerprint|client_id`).
pub const COMPOSITE_ID_SEPARATOR: char = '|';

/// Merchant credentials for the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCredentials {
    pub client_id: String,
    /// Present only when webhook mode is enabled.
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub webhooks_enabled: bool,
}

impl GatewayCredentials {
    /// Enforce the credential invariant: webhook mode requires both a
    /// client id and a client secret.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.client_id.is_empty() {
            return Err(GatewayError::Credentials("client id is empty"));
        }
        if self.webhooks_enabled && self.webhook_secret().is_none() {
            return Err(GatewayError::Credentials(
                "webhook mode requires a client secret",
            ));
        }
        Ok(())
    }

    /// The shared secret, `Some` only when webhook mode is enabled and the
    /// secret is non-empty.
    pub fn webhook_secret(&self) -> Option<&str> {
        if !self.webhooks_enabled {
            return None;
        }
        self.client_secret.as_deref().filter(|s| !s.is_empty())
    }
}

/// Full gateway configuration, owned by the external settings store and
/// read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub credentials: GatewayCredentials,
    /// Base URL of this installation, without a trailing slash
    /// (e.g. `https://billing.example.com`). The processor calls back to it
    /// and the host fingerprint is derived from it.
    pub callback_url: String,
    /// Company identifier, part of the notification URL path.
    pub company_id: String,
    /// Store name shown in invoice notes.
    pub store_name: String,
    /// Integration label attached to invoice metadata
    /// (`"<product>_v<version>"`).
    pub integration: String,
}

impl GatewayConfig {
    /// The notification URL registered with the processor for an invoice
    /// status event.
    ///
    /// The processor signs webhook deliveries over this exact string, so it
    /// must be reproducible byte-for-byte from configuration alone.
    pub fn notification_url(&self, event: &str) -> String {
        format!(
            "{}/{}{}?clientId={}&event={}",
            self.callback_url,
            self.company_id,
            NOTIFICATION_PATH,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(event),
        )
    }

    /// Lowercase hex MD5 of the callback URL; embedded in outbound invoice
    /// ids and checked against inbound notifications so a notification
    /// meant for another installation is never applied here.
    pub fn host_fingerprint(&self) -> String {
        hex::encode(Md5::digest(self.callback_url.as_bytes()))
    }

    /// Composite invoice id: `md5(callback_url)|local_client_id`.
    pub fn composite_invoice_id(&self, local_client_id: &str) -> String {
        format!(
            "{}{}{}",
            self.host_fingerprint(),
            COMPOSITE_ID_SEPARATOR,
            local_client_id
        )
    }

    /// Invoice metadata sent with every creation request.
    pub fn invoice_metadata(&self) -> InvoiceMetadata {
        InvoiceMetadata {
            integration: self.integration.clone(),
            hostname: self.callback_url.clone(),
        }
    }
}

/// Split a composite invoice id into `(host_fingerprint, local_client_id)`.
pub fn split_composite_id(composite: &str) -> Option<(&str, &str)> {
    composite.split_once(COMPOSITE_ID_SEPARATOR)
}
