//! End-to-end gateway flows against a mock processor.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cpgw_core::billing::{BillingContext, ContactNumber, ContactNumberKind, PaymentOptions};
use cpgw_core::config::{GatewayConfig, GatewayCredentials};
use cpgw_core::orchestrator::InvoiceOrchestrator;
use cpgw_core::settings::validate_client_secret;
use cpgw_core::transaction::TransactionStatus;
use cpgw_core::webhook::WebhookValidator;
use cpgw_sdk::client::ApiClient;
use cpgw_sdk::objects::invoice::InvoiceAllocation;
use cpgw_sdk::signature::{encode_signature, webhook_message};

const SECRET: &str = "merchant-secret";

fn gateway_config(webhooks: bool) -> Arc<GatewayConfig> {
    Arc::new(GatewayConfig {
        credentials: GatewayCredentials {
            client_id: "client-1".into(),
            client_secret: webhooks.then(|| SECRET.to_owned()),
            webhooks_enabled: webhooks,
        },
        callback_url: "https://billing.example.com".into(),
        company_id: "1".into(),
        store_name: "Acme Hosting".into(),
        integration: "cpgw_v0.1.0".into(),
    })
}

fn api_for(server: &MockServer, config: &GatewayConfig) -> ApiClient {
    ApiClient::new(config.invoice_metadata())
        .unwrap()
        .with_base_url(format!("{}/api/v1/", server.uri()))
}

fn billing_context() -> BillingContext {
    BillingContext {
        client_id: "42".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        company: "Acme".into(),
        email: "ada@example.com".into(),
        address_1: "1 Main St".into(),
        address_2: String::new(),
        city: "Springfield".into(),
        state: "IL".into(),
        country: "US".into(),
        zip: "62704".into(),
        numbers: vec![ContactNumber {
            kind: ContactNumberKind::Phone,
            number: "+1 (555) 123-4567".into(),
        }],
    }
}

async fn mount_usd(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/currencies"))
        .and(query_param("types", "fiat"))
        .and(query_param("q", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 5057, "symbol": "USD", "decimalPlaces": 2}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn webhook_mode_checkout_goes_through_merchant_path() {
    let server = MockServer::start().await;
    mount_usd(&server).await;

    // Only the merchant endpoint is mounted: a request to the simple path
    // would fail the test with a 404.
    Mock::given(method("POST"))
        .and(path("/api/v1/merchant/invoices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"invoices": [{"id": "inv-777"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = gateway_config(true);
    let orchestrator = InvoiceOrchestrator::new(api_for(&server, &config), config.clone());

    let allocations = vec![InvoiceAllocation {
        id: "7".into(),
        amount: Decimal::new(2500, 2),
    }];
    let form = orchestrator
        .create_checkout(
            &billing_context(),
            Decimal::new(2500, 2),
            "USD",
            &allocations,
            &PaymentOptions {
                description: "Invoice #7".into(),
                return_url: "https://billing.example.com/return".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(form.invoice_id, "inv-777");
    assert_eq!(form.post_to, "https://checkout.coinpayments.net/checkout/");
    assert_eq!(form.success_url, "https://billing.example.com/return");
    assert_eq!(form.cancel_url, "https://billing.example.com/return");

    // Inspect what actually went over the wire.
    let requests = server.received_requests().await.unwrap();
    let invoice_request = requests
        .iter()
        .find(|r| r.url.path() == "/api/v1/merchant/invoices")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&invoice_request.body).unwrap();

    assert_eq!(body["amount"]["value"], "2500");
    assert_eq!(body["amount"]["currencyId"], 5057);
    let notes = body["notesToRecipient"].as_str().unwrap();
    assert!(notes.contains("editinvoice/42/7"));
    assert!(notes.contains("Store name: Acme Hosting"));
    assert!(notes.contains("Client #42 Invoice #7"));
    assert_eq!(body["buyer"]["phoneNumber"], "15551234567");
    assert_eq!(body["buyer"]["emailAddress"], "ada@example.com");

    let composite = body["invoiceId"].as_str().unwrap();
    let (host_hash, local_id) = composite.split_once('|').unwrap();
    assert_eq!(host_hash, config.host_fingerprint());
    assert_eq!(local_id, "42");
}

#[tokio::test]
async fn non_webhook_checkout_goes_through_simple_path() {
    let server = MockServer::start().await;
    mount_usd(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "inv-100"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = gateway_config(false);
    let orchestrator = InvoiceOrchestrator::new(api_for(&server, &config), config.clone());

    let form = orchestrator
        .create_checkout(
            &billing_context(),
            Decimal::new(1000, 2),
            "USD",
            &[],
            &PaymentOptions {
                description: String::new(),
                return_url: "https://billing.example.com/return".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(form.invoice_id, "inv-100");

    let requests = server.received_requests().await.unwrap();
    let invoice_request = requests
        .iter()
        .find(|r| r.url.path() == "/api/v1/invoices")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&invoice_request.body).unwrap();
    assert_eq!(body["clientId"], "client-1");
    assert!(body.get("custom").is_none(), "empty allocations must be omitted");
}

#[tokio::test]
async fn unknown_currency_fails_before_any_invoice_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/currencies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let config = gateway_config(true);
    let orchestrator = InvoiceOrchestrator::new(api_for(&server, &config), config.clone());

    let err = orchestrator
        .create_checkout(
            &billing_context(),
            Decimal::new(1000, 2),
            "XYZ",
            &[],
            &PaymentOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        cpgw_core::error::GatewayError::UnsupportedCurrency(code) if code == "XYZ"
    ));
}

#[tokio::test]
async fn currency_with_excessive_precision_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/currencies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 9001, "symbol": "XPR", "decimalPlaces": 24}]
        })))
        .mount(&server)
        .await;

    let config = gateway_config(true);
    let orchestrator = InvoiceOrchestrator::new(api_for(&server, &config), config.clone());

    let err = orchestrator
        .create_checkout(
            &billing_context(),
            Decimal::new(1000, 2),
            "XPR",
            &[],
            &PaymentOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        cpgw_core::error::GatewayError::UnsupportedCurrency(code) if code == "XPR"
    ));
}

#[tokio::test]
async fn secret_validation_registers_missing_webhooks() {
    let server = MockServer::start().await;
    let config = gateway_config(true);

    // Only the Paid hook is registered; validation must create both events.
    Mock::given(method("GET"))
        .and(path("/api/v1/merchant/clients/client-1/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"notificationsUrl": config.notification_url("Paid")}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/merchant/clients/client-1/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "wh-1",
            "notificationsUrl": config.notification_url("Paid")
        })))
        .expect(2)
        .mount(&server)
        .await;

    let outcome = validate_client_secret(&api_for(&server, &config), &config).await;
    assert!(outcome.valid);

    let requests = server.received_requests().await.unwrap();
    let subscriptions: Vec<String> = requests
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["notifications"][0].as_str().unwrap().to_owned()
        })
        .collect();
    assert!(subscriptions.contains(&"invoicePaid".to_owned()));
    assert!(subscriptions.contains(&"invoiceCancelled".to_owned()));
}

#[tokio::test]
async fn secret_validation_passes_when_both_webhooks_registered() {
    let server = MockServer::start().await;
    let config = gateway_config(true);

    // No POST endpoint is mounted: a registration attempt would 404 and
    // flip the outcome to invalid.
    Mock::given(method("GET"))
        .and(path("/api/v1/merchant/clients/client-1/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"notificationsUrl": config.notification_url("Paid")},
                {"notificationsUrl": config.notification_url("Cancelled")}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = validate_client_secret(&api_for(&server, &config), &config).await;
    assert!(outcome.valid);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn verified_webhook_emits_transaction_with_allocations() {
    let server = MockServer::start().await;
    let config = gateway_config(true);

    let body = format!(
        r#"{{"invoice":{{"id":"inv-900","invoiceId":"{}|42","status":"Paid","amount":{{"displayValue":"25.00"}},"currency":{{"symbol":"USD"}}}}}}"#,
        config.host_fingerprint()
    )
    .into_bytes();
    let url = config.notification_url("Paid");
    let signature = encode_signature(&webhook_message(&url, &body), SECRET);

    Mock::given(method("GET"))
        .and(path("/api/v1/invoices/inv-900"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "inv-900",
            "customData": {"amounts": "[{\"id\":\"7\",\"amount\":\"25.00\"}]"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let validator = WebhookValidator::new(api_for(&server, &config), config.clone());
    let transaction = validator
        .validate(Some(&signature), &body)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(transaction.client_id, "42");
    assert_eq!(transaction.status, TransactionStatus::Approved);
    assert_eq!(transaction.amount, "25.00");
    assert_eq!(transaction.currency, "USD");
    assert_eq!(transaction.transaction_id, "inv-900");
    assert_eq!(transaction.invoice_amounts.len(), 1);
    assert_eq!(transaction.invoice_amounts[0].id, "7");
}

#[tokio::test]
async fn rejected_webhook_never_fetches_invoice_detail() {
    let server = MockServer::start().await;
    let config = gateway_config(true);

    let body = format!(
        r#"{{"invoice":{{"id":"inv-900","invoiceId":"{}|42","status":"Paid"}}}}"#,
        config.host_fingerprint()
    )
    .into_bytes();

    let validator = WebhookValidator::new(api_for(&server, &config), config.clone());
    let result = validator
        .validate(Some("bogus-signature"), &body)
        .await
        .unwrap();
    assert!(result.is_none());

    // The trust boundary held: nothing went out to the processor.
    assert!(server.received_requests().await.unwrap().is_empty());
}
