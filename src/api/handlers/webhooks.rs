use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

use super::run_blocking;
use crate::api::response::{ApiError, AppJson};
use crate::session::{WebhookCaller, WebhookOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PolkaEvent {
    /// Only upgrade events need a payload
    #[serde(default)]
    pub data: PolkaEventData,
    pub event: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PolkaEventData {
    #[serde(default)]
    pub user_id: u64,
}

/// Polka billing webhook. Non-upgrade events are acknowledged and ignored.
pub async fn polka_webhook(
    State(state): State<Arc<AppState>>,
    caller: WebhookCaller,
    AppJson(req): AppJson<PolkaEvent>,
) -> Result<StatusCode, ApiError> {
    let session = state.session.clone();
    let outcome = run_blocking(move || {
        session.handle_webhook(&caller, &req.event, req.data.user_id)
    })
    .await
    .map_err(|e| match e.status() {
        StatusCode::NOT_FOUND => ApiError::not_found("Couldn't find user"),
        _ => e,
    })?;

    if let WebhookOutcome::Upgraded(user) = outcome {
        tracing::debug!(user_id = user.id, "Processed upgrade webhook");
    }
    Ok(StatusCode::NO_CONTENT)
}
