//! Payment creation handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use cpgw_core::billing::{BillingContext, PaymentOptions};
use cpgw_core::error::GatewayError;
use cpgw_sdk::objects::invoice::InvoiceAllocation;

use crate::state::AppState;

/// `POST /api/v1/payments` request body.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Billing contact the invoice is issued to.
    pub contact: BillingContext,
    /// Total amount in the display currency.
    pub amount: Decimal,
    /// ISO currency code, e.g. `USD`.
    pub currency: String,
    /// Per-invoice amounts covered by this payment.
    #[serde(default)]
    pub invoice_amounts: Vec<InvoiceAllocation>,
    pub options: PaymentOptions,
}

/// `POST /api/v1/payments` — create a processor invoice and return the
/// checkout form the buyer should be sent through.
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let form = state
        .orchestrator
        .create_checkout(
            &request.contact,
            request.amount,
            &request.currency,
            &request.invoice_amounts,
            &request.options,
        )
        .await?;

    Ok(Json(form))
}

/// Errors that can occur in payment handlers.
#[derive(Debug)]
pub struct PaymentApiError(GatewayError);

impl From<GatewayError> for PaymentApiError {
    fn from(e: GatewayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            GatewayError::UnsupportedCurrency(code) => {
                tracing::warn!(currency = %code, "Payment requested in unsupported currency");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "currency not supported by the processor",
                )
                    .into_response()
            }
            GatewayError::Api(e) => {
                tracing::error!(error = %e, "Processor API call failed");
                (StatusCode::BAD_GATEWAY, "payment processor unavailable").into_response()
            }
            e => {
                tracing::error!(error = %e, "Payment creation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
