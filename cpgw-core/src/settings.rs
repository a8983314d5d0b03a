//! Credential validation for the gateway settings form.
//!
//! Each rule is a named validator returning a structured outcome; the
//! settings UI composes them and renders failures as field-level messages.
//! Validation failures are always recovered locally — a dead processor at
//! settings time means "invalid credentials", not a crash.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::GatewayConfig;
use cpgw_sdk::client::ApiClient;
use cpgw_sdk::objects::invoice::InvoiceRequest;
use cpgw_sdk::objects::webhook::{CANCELLED_EVENT, PAID_EVENT};

/// Currency id used for the credential probe invoice (USD).
const PROBE_CURRENCY_ID: u32 = 5057;

/// Invoice id used for the credential probe invoice.
const PROBE_INVOICE_ID: &str = "Validate invoice";

/// Result of a single settings validator.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub field: &'static str,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationOutcome {
    fn ok(field: &'static str) -> Self {
        Self {
            field,
            valid: true,
            message: None,
        }
    }

    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Validate the client id.
///
/// Without webhook mode there is no signed call to prove the credentials
/// with, so a throwaway simple invoice is created as a probe; a returned
/// invoice id means the processor accepted the client id.
pub async fn validate_client_id(api: &ApiClient, config: &GatewayConfig) -> ValidationOutcome {
    const FIELD: &str = "client_id";

    if config.credentials.client_id.is_empty() {
        return ValidationOutcome::invalid(FIELD, "The client ID appears to be invalid.");
    }
    if config.credentials.webhooks_enabled {
        // The secret validator exercises the signed API for this pair.
        return ValidationOutcome::ok(FIELD);
    }

    let probe = InvoiceRequest {
        client_id: config.credentials.client_id.clone(),
        invoice_id: PROBE_INVOICE_ID.to_owned(),
        currency_id: PROBE_CURRENCY_ID,
        value: "1".to_owned(),
        display_value: Decimal::new(1, 2),
        allocations: Vec::new(),
        buyer: None,
        notes: None,
    };

    match api.create_simple_invoice(&probe).await {
        Ok(invoice) if !invoice.id.is_empty() => ValidationOutcome::ok(FIELD),
        Ok(_) => ValidationOutcome::invalid(FIELD, "The client ID appears to be invalid."),
        Err(e) => {
            tracing::debug!(error = %e, "Credential probe invoice failed");
            ValidationOutcome::invalid(FIELD, "The client ID appears to be invalid.")
        }
    }
}

/// Validate the client secret and, in webhook mode, make sure both invoice
/// status events have a registered webhook, creating the missing ones.
pub async fn validate_client_secret(api: &ApiClient, config: &GatewayConfig) -> ValidationOutcome {
    const FIELD: &str = "client_secret";

    if !config.credentials.webhooks_enabled {
        return ValidationOutcome::ok(FIELD);
    }

    let client_id = &config.credentials.client_id;
    let Some(secret) = config
        .credentials
        .client_secret
        .as_deref()
        .filter(|s| !s.is_empty() && !client_id.is_empty())
    else {
        return ValidationOutcome::invalid(
            FIELD,
            "Webhook mode requires both a client ID and a client secret.",
        );
    };

    let registered = match api.list_webhooks(client_id, secret).await {
        Ok(list) => list,
        Err(e) => {
            tracing::debug!(error = %e, "Webhook listing failed during validation");
            return ValidationOutcome::invalid(FIELD, "The client secret appears to be invalid.");
        }
    };

    let urls = registered.notification_urls();
    let paid_url = config.notification_url(PAID_EVENT);
    let cancelled_url = config.notification_url(CANCELLED_EVENT);

    if urls.contains(&paid_url.as_str()) && urls.contains(&cancelled_url.as_str()) {
        return ValidationOutcome::ok(FIELD);
    }

    for (url, event) in [(paid_url, PAID_EVENT), (cancelled_url, CANCELLED_EVENT)] {
        if let Err(e) = api.create_webhook(client_id, secret, &url, event).await {
            tracing::debug!(error = %e, event, "Webhook registration failed");
            return ValidationOutcome::invalid(
                FIELD,
                "Webhook registration with the processor failed.",
            );
        }
    }

    ValidationOutcome::ok(FIELD)
}

/// Run all settings validators.
pub async fn validate_settings(api: &ApiClient, config: &GatewayConfig) -> Vec<ValidationOutcome> {
    vec![
        validate_client_id(api, config).await,
        validate_client_secret(api, config).await,
    ]
}
