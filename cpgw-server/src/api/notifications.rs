//! Processor webhook and checkout-return handlers.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use cpgw_core::transaction::{TransactionStatus, return_url_status};
use cpgw_sdk::signature::SIGNATURE_HEADER;

use crate::state::AppState;

/// `POST /callback/{company_id}/coin_payments/` — inbound payment
/// notification from the processor.
///
/// Rejections are uniform: whatever check failed (unknown company path, bad
/// signature, foreign host fingerprint), the caller sees the same 400 with
/// no detail. Details go to the debug log only.
pub async fn receive_notification(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if company_id != state.config.company_id {
        tracing::debug!(%company_id, "Notification for unknown company path");
        return StatusCode::BAD_REQUEST.into_response();
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match state.validator.validate(signature, &body).await {
        Ok(Some(transaction)) => {
            state.ledger.record(transaction).await;
            StatusCode::OK.into_response()
        }
        Ok(None) => StatusCode::BAD_REQUEST.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Invoice detail lookup failed for verified notification");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

/// Response for the checkout return path.
#[derive(Serialize)]
pub struct ReturnResponse {
    status: TransactionStatus,
}

/// `GET /callback/return` — buyers land here after checkout. The return
/// redirect carries no verified payment state, so the status is always
/// pending; the webhook delivers the real outcome.
pub async fn checkout_return() -> impl IntoResponse {
    Json(ReturnResponse {
        status: return_url_status(),
    })
}
