use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::users::CredentialsRequest;
use super::{run_blocking, UserResponse};
use crate::api::middleware::authorization;
use crate::api::response::{ApiError, AppJson};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub refresh_token: String,
    pub token: String,
    #[serde(flatten)]
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = state.session.clone();
    let outcome = run_blocking(move || session.login(&req.email, &req.password)).await?;

    Ok(Json(LoginResponse {
        refresh_token: outcome.refresh_token,
        token: outcome.access_token,
        user: outcome.user.into(),
    }))
}

/// Exchange the bearer refresh token for a fresh access token
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let session = state.session.clone();
    let header = authorization(&headers).map(str::to_owned);
    let token = run_blocking(move || session.refresh(header.as_deref())).await?;

    Ok(Json(RefreshResponse { token }))
}

pub async fn revoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = state.session.clone();
    let header = authorization(&headers).map(str::to_owned);
    run_blocking(move || session.revoke(header.as_deref())).await?;

    Ok(StatusCode::NO_CONTENT)
}
