use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::{run_blocking, UserResponse};
use crate::api::response::{ApiError, AppJson};
use crate::session::Authenticated;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let session = state.session.clone();
    let user = run_blocking(move || session.register(&req.email, &req.password)).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Full overwrite of the caller's email and password
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    caller: Authenticated,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let session = state.session.clone();
    let user =
        run_blocking(move || session.update_user(&caller, &req.email, &req.password)).await?;

    Ok(Json(user.into()))
}
