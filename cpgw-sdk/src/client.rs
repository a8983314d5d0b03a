//! Typed HTTP client for the CoinPayments v1 API.
//!
//! One canonical client covers every API action the gateway needs; requests
//! are signed with the merchant secret where the API demands it (see
//! [`crate::signature`]) and sent unsigned otherwise.

use reqwest::StatusCode;
use time::format_description::well_known::Rfc3339;

use crate::objects::currency::{CurrencyInfo, CurrencyList, FIAT_TYPE};
use crate::objects::invoice::{Invoice, InvoiceDetail, InvoiceMetadata, InvoiceRequest, MerchantInvoices};
use crate::objects::webhook::{invoice_notification, WebhookInfo, WebhookList, WebhookRegistration};
use crate::signature::{self, CLIENT_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Root of the CoinPayments v1 API.
pub const API_BASE_URL: &str = "https://api.coinpayments.net/api/v1/";

/// Checkout endpoint the browser is redirected to after invoice creation.
pub const CHECKOUT_URL: &str = "https://checkout.coinpayments.net/checkout/";

/// Default request timeout; the transport default is unbounded, which is not
/// acceptable for a payment flow.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Errors produced by the API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request timestamp could not be formatted.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Typed HTTP client for the CoinPayments v1 API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    metadata: InvoiceMetadata,
}

impl ApiClient {
    /// Create a new `ApiClient` against the production API.
    ///
    /// `metadata` is attached to every created invoice (integration label
    /// and callback hostname). Fails if the TLS backend cannot be
    /// initialized; the bounded request timeout is never dropped.
    pub fn new(metadata: InvoiceMetadata) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: API_BASE_URL.to_owned(),
            metadata,
        })
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure a proxy).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Point the client at a different API root. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        self
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}{}", self.base_url, action)
    }

    /// `POST invoices` — create an invoice on the unsigned path.
    ///
    /// Used for non-webhook installations and for credential probing.
    pub async fn create_simple_invoice(
        &self,
        request: &InvoiceRequest,
    ) -> Result<Invoice, ClientError> {
        let url = self.endpoint("invoices");
        let body = serde_json::to_string(&request.wire(&self.metadata, true))?;

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `POST merchant/invoices` — create an invoice on the signed path.
    ///
    /// The response carries a list; the caller takes the first element.
    pub async fn create_merchant_invoice(
        &self,
        request: &InvoiceRequest,
        secret: &str,
    ) -> Result<MerchantInvoices, ClientError> {
        let url = self.endpoint("merchant/invoices");
        let body = serde_json::to_string(&request.wire(&self.metadata, false))?;

        let resp = self
            .send_signed(reqwest::Method::POST, &url, &request.client_id, secret, Some(body))
            .await?;

        parse_response(resp).await
    }

    /// `GET invoices/{id}` — fetch full invoice detail, signed when a
    /// secret is supplied.
    pub async fn get_invoice(
        &self,
        invoice_id: &str,
        client_id: &str,
        secret: Option<&str>,
    ) -> Result<InvoiceDetail, ClientError> {
        let url = self.endpoint(&format!("invoices/{invoice_id}"));

        let resp = match secret {
            Some(secret) => {
                self.send_signed(reqwest::Method::GET, &url, client_id, secret, None)
                    .await?
            }
            None => self.http.get(&url).send().await?,
        };

        parse_response(resp).await
    }

    /// `GET merchant/clients/{client_id}/webhooks` — list registered
    /// webhooks. Always signed.
    pub async fn list_webhooks(
        &self,
        client_id: &str,
        secret: &str,
    ) -> Result<WebhookList, ClientError> {
        let url = self.endpoint(&format!("merchant/clients/{client_id}/webhooks"));

        let resp = self
            .send_signed(reqwest::Method::GET, &url, client_id, secret, None)
            .await?;

        parse_response(resp).await
    }

    /// `POST merchant/clients/{client_id}/webhooks` — register a webhook
    /// for an invoice status event. Always signed.
    ///
    /// `notification_url` is owned by the caller: it must be the exact URL
    /// later reconstructed during webhook verification.
    pub async fn create_webhook(
        &self,
        client_id: &str,
        secret: &str,
        notification_url: &str,
        event: &str,
    ) -> Result<WebhookInfo, ClientError> {
        let url = self.endpoint(&format!("merchant/clients/{client_id}/webhooks"));
        let registration = WebhookRegistration {
            notifications_url: notification_url.to_owned(),
            notifications: vec![invoice_notification(event)],
        };
        let body = serde_json::to_string(&registration)?;

        let resp = self
            .send_signed(reqwest::Method::POST, &url, client_id, secret, Some(body))
            .await?;

        parse_response(resp).await
    }

    /// `GET currencies?types=fiat&q={code}` — resolve a fiat currency.
    /// Unsigned; returns the first match or `None`.
    pub async fn lookup_fiat_currency(
        &self,
        code: &str,
    ) -> Result<Option<CurrencyInfo>, ClientError> {
        let url = format!(
            "{}currencies?types={}&q={}",
            self.base_url,
            FIAT_TYPE,
            urlencoding::encode(code)
        );

        let resp = self.http.get(&url).send().await?;
        let list: CurrencyList = parse_response(resp).await?;
        Ok(list.items.into_iter().next())
    }

    /// Send a signed request: the signature covers method, full URL, client
    /// id, timestamp, and body, and the timestamp header carries the exact
    /// string that was signed.
    async fn send_signed(
        &self,
        method: reqwest::Method,
        url: &str,
        client_id: &str,
        secret: &str,
        body: Option<String>,
    ) -> Result<reqwest::Response, ClientError> {
        let timestamp = time::OffsetDateTime::now_utc().format(&Rfc3339)?;
        let body_json = body.as_deref().unwrap_or("");
        let message =
            signature::request_message(method.as_str(), url, client_id, &timestamp, body_json);
        let sig = signature::encode_signature(&message, secret);

        let mut request = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(CLIENT_HEADER, client_id)
            .header(TIMESTAMP_HEADER, &timestamp)
            .header(SIGNATURE_HEADER, sig);

        if let Some(body) = body {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
