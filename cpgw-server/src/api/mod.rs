//! HTTP API handlers.
//!
//! Two surfaces are exposed:
//!
//! - `/api/v1` — called by the billing platform backend (payments,
//!   settings validation)
//! - `/callback` — called by the payment processor and by buyers returning
//!   from checkout

mod notifications;
mod payments;
mod settings;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the backend-facing API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", post(payments::create_payment))
        .route("/settings/validate", post(settings::validate))
}

/// Build the processor/buyer-facing callback router.
pub fn callback_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{company_id}/coin_payments/",
            post(notifications::receive_notification),
        )
        .route("/return", get(notifications::checkout_return))
}
