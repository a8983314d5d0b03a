//! Settings validation handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use cpgw_core::settings::validate_settings;

use crate::state::AppState;

/// `POST /api/v1/settings/validate` — run the credential validators against
/// the configured gateway settings and report per-field outcomes.
///
/// In webhook mode this also registers any missing webhooks with the
/// processor, so it should be called after every settings change.
pub async fn validate(State(state): State<AppState>) -> impl IntoResponse {
    let outcomes = validate_settings(&state.api, &state.config).await;
    Json(outcomes)
}
