//! Invoice orchestration: from billing context to checkout form.
//!
//! The orchestrator assembles an invoice request from the billing side's
//! data, resolves the processor currency, and dispatches it on the path the
//! credentials allow: the signed merchant path when webhook mode is on, the
//! unsigned simple path otherwise.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::billing::{BillingContext, PaymentOptions};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use cpgw_sdk::client::{ApiClient, CHECKOUT_URL};
use cpgw_sdk::objects::currency::CurrencyInfo;
use cpgw_sdk::objects::invoice::{Invoice, InvoiceAllocation, InvoiceRequest};

/// Which API path an invoice will be created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoicePath {
    /// Unsigned `POST invoices`.
    Simple,
    /// Signed `POST merchant/invoices`; requires the client secret.
    Merchant,
}

/// A fully assembled invoice request plus the path it should go out on.
#[derive(Debug, Clone)]
pub struct InvoicePlan {
    pub request: InvoiceRequest,
    pub path: InvoicePath,
}

/// Hidden form fields for the browser redirect to the processor checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutForm {
    /// Where the form posts to.
    pub post_to: String,
    #[serde(rename = "invoice-id")]
    pub invoice_id: String,
    #[serde(rename = "success-url")]
    pub success_url: String,
    #[serde(rename = "cancel-url")]
    pub cancel_url: String,
}

/// Highest decimal precision accepted from the currency catalog; `10^19`
/// no longer fits in a `u64`.
pub const MAX_CURRENCY_PRECISION: u32 = 18;

/// Format an amount as an integer minor-unit string for the given decimal
/// precision: 10.00 at precision 2 becomes `"1000"`. Rounds half away from
/// zero, matching the processor's fixed-point expectations. The precision is
/// clamped to [`MAX_CURRENCY_PRECISION`]; the catalog value is untrusted and
/// must not pick the scaling exponent unchecked.
pub fn format_minor_units(amount: Decimal, decimal_places: u32) -> String {
    let decimal_places = decimal_places.min(MAX_CURRENCY_PRECISION);
    let scale = Decimal::from(10u64.pow(decimal_places));
    let scaled =
        amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
            * scale;
    scaled.trunc().normalize().to_string()
}

/// Build the human-readable note attached to the invoice:
/// `"{order_url}|Store name: {store}|{order_description}"`.
///
/// With exactly one allocation the order reference points at that invoice;
/// otherwise it points at the client's overview page.
pub fn order_note(
    config: &GatewayConfig,
    local_client_id: &str,
    allocations: &[InvoiceAllocation],
) -> String {
    let (order_url, order_str) = match allocations {
        [single] => (
            format!(
                "{}/admin/clients/editinvoice/{}/{}",
                config.callback_url, local_client_id, single.id
            ),
            format!("Client #{} Invoice #{}", local_client_id, single.id),
        ),
        _ => (
            format!(
                "{}/admin/clients/view/{}",
                config.callback_url, local_client_id
            ),
            format!("Client #{local_client_id}"),
        ),
    };
    format!(
        "{}|Store name: {}|{}",
        order_url, config.store_name, order_str
    )
}

/// Builds invoices from billing-context data and dispatches them to the
/// processor.
pub struct InvoiceOrchestrator {
    api: ApiClient,
    config: Arc<GatewayConfig>,
}

impl InvoiceOrchestrator {
    pub fn new(api: ApiClient, config: Arc<GatewayConfig>) -> Self {
        Self { api, config }
    }

    /// Assemble the invoice request and choose the API path. Pure: no
    /// network, fully determined by its inputs.
    pub fn plan_invoice(
        &self,
        context: &BillingContext,
        amount: Decimal,
        currency: &CurrencyInfo,
        allocations: &[InvoiceAllocation],
    ) -> InvoicePlan {
        let request = InvoiceRequest {
            client_id: self.config.credentials.client_id.clone(),
            invoice_id: self.config.composite_invoice_id(&context.client_id),
            currency_id: currency.id,
            value: format_minor_units(amount, currency.decimal_places),
            display_value: amount,
            allocations: allocations.to_vec(),
            buyer: Some(context.buyer_profile()),
            notes: Some(order_note(&self.config, &context.client_id, allocations)),
        };
        let path = if self.config.credentials.webhook_secret().is_some() {
            InvoicePath::Merchant
        } else {
            InvoicePath::Simple
        };
        InvoicePlan { request, path }
    }

    /// Create an invoice for the given billing context and return the
    /// checkout form the buyer's browser posts to the processor.
    ///
    /// Failures propagate: a payment the processor refused to start is a
    /// user-visible error, not something to swallow.
    pub async fn create_checkout(
        &self,
        context: &BillingContext,
        amount: Decimal,
        currency_code: &str,
        allocations: &[InvoiceAllocation],
        options: &PaymentOptions,
    ) -> Result<CheckoutForm, GatewayError> {
        let currency = self
            .api
            .lookup_fiat_currency(currency_code)
            .await?
            .filter(|c| c.decimal_places <= MAX_CURRENCY_PRECISION)
            .ok_or_else(|| GatewayError::UnsupportedCurrency(currency_code.to_owned()))?;

        let plan = self.plan_invoice(context, amount, &currency, allocations);

        let invoice = match plan.path {
            InvoicePath::Merchant => {
                // plan_invoice only selects this path when the secret exists.
                let secret = self
                    .config
                    .credentials
                    .webhook_secret()
                    .ok_or(GatewayError::Credentials(
                        "webhook mode requires a client secret",
                    ))?;
                let response = self
                    .api
                    .create_merchant_invoice(&plan.request, secret)
                    .await?;
                response
                    .invoices
                    .into_iter()
                    .next()
                    .ok_or(GatewayError::EmptyInvoiceList)?
            }
            InvoicePath::Simple => self.api.create_simple_invoice(&plan.request).await?,
        };

        tracing::info!(
            invoice_id = %invoice.id,
            client_id = %context.client_id,
            amount = %amount,
            currency = %currency.symbol,
            "Created processor invoice"
        );

        Ok(self.checkout_form(&invoice, options))
    }

    fn checkout_form(&self, invoice: &Invoice, options: &PaymentOptions) -> CheckoutForm {
        CheckoutForm {
            post_to: CHECKOUT_URL.to_owned(),
            invoice_id: invoice.id.clone(),
            success_url: options.return_url.clone(),
            cancel_url: options.return_url.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{split_composite_id, GatewayCredentials};

    fn config(webhooks: bool) -> Arc<GatewayConfig> {
        Arc::new(GatewayConfig {
            credentials: GatewayCredentials {
                client_id: "client-1".into(),
                client_secret: webhooks.then(|| "secret".to_owned()),
                webhooks_enabled: webhooks,
            },
            callback_url: "https://billing.example.com".into(),
            company_id: "1".into(),
            store_name: "Acme Hosting".into(),
            integration: "cpgw_v0.1.0".into(),
        })
    }

    fn orchestrator(webhooks: bool) -> InvoiceOrchestrator {
        let metadata = config(webhooks).invoice_metadata();
        InvoiceOrchestrator::new(ApiClient::new(metadata).unwrap(), config(webhooks))
    }

    fn usd() -> CurrencyInfo {
        CurrencyInfo {
            id: 5057,
            symbol: "USD".into(),
            decimal_places: 2,
        }
    }

    fn context() -> BillingContext {
        BillingContext {
            client_id: "42".into(),
            ..Default::default()
        }
    }

    #[test]
    fn minor_unit_formatting() {
        assert_eq!(format_minor_units("10.00".parse().unwrap(), 2), "1000");
        assert_eq!(format_minor_units("0.01".parse().unwrap(), 2), "1");
        assert_eq!(format_minor_units("25".parse().unwrap(), 2), "2500");
        assert_eq!(format_minor_units("1.005".parse().unwrap(), 2), "101");
        assert_eq!(format_minor_units("3.14159".parse().unwrap(), 0), "3");
        assert_eq!(format_minor_units("2.5".parse().unwrap(), 8), "250000000");
    }

    #[test]
    fn minor_unit_precision_is_clamped() {
        // A catalog precision beyond the u64 exponent range must not panic
        // or wrap; it clamps to the supported maximum.
        let amount: Decimal = "1.5".parse().unwrap();
        assert_eq!(
            format_minor_units(amount, 40),
            format_minor_units(amount, MAX_CURRENCY_PRECISION)
        );
    }

    #[test]
    fn note_references_single_invoice() {
        let allocations = vec![InvoiceAllocation {
            id: "7".into(),
            amount: Decimal::new(2500, 2),
        }];
        let note = order_note(&config(true), "42", &allocations);
        assert_eq!(
            note,
            "https://billing.example.com/admin/clients/editinvoice/42/7\
             |Store name: Acme Hosting|Client #42 Invoice #7"
        );
    }

    #[test]
    fn note_references_client_overview_for_multiple_invoices() {
        let allocations = vec![
            InvoiceAllocation {
                id: "7".into(),
                amount: Decimal::new(1000, 2),
            },
            InvoiceAllocation {
                id: "8".into(),
                amount: Decimal::new(1500, 2),
            },
        ];
        let note = order_note(&config(true), "42", &allocations);
        assert!(note.starts_with("https://billing.example.com/admin/clients/view/42|"));
        assert!(note.ends_with("|Client #42"));
    }

    #[test]
    fn plan_uses_merchant_path_with_webhooks_enabled() {
        let plan = orchestrator(true).plan_invoice(
            &context(),
            Decimal::new(2500, 2),
            &usd(),
            &[InvoiceAllocation {
                id: "7".into(),
                amount: Decimal::new(2500, 2),
            }],
        );
        assert_eq!(plan.path, InvoicePath::Merchant);
        assert_eq!(plan.request.value, "2500");
        assert!(plan.request.notes.as_deref().unwrap().contains("Invoice #7"));

        let (host_hash, local_id) =
            split_composite_id(&plan.request.invoice_id).unwrap();
        assert_eq!(host_hash, config(true).host_fingerprint());
        assert_eq!(local_id, "42");
    }

    #[test]
    fn plan_uses_simple_path_without_webhooks() {
        let plan = orchestrator(false).plan_invoice(
            &context(),
            Decimal::new(2500, 2),
            &usd(),
            &[],
        );
        assert_eq!(plan.path, InvoicePath::Simple);
        assert!(plan.request.allocations.is_empty());
    }
}
