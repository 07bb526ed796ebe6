use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::run_blocking;
use crate::api::response::{ApiError, AppJson, AppPath, AppQuery};
use crate::session::{Authenticated, SortOrder};
use crate::storage::models::Post;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ListChirpsParams {
    #[serde(default)]
    pub author_id: Option<u64>,
    #[serde(default)]
    pub sort: SortParam,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortParam {
    #[default]
    Asc,
    Desc,
}

impl From<SortParam> for SortOrder {
    fn from(sort: SortParam) -> Self {
        match sort {
            SortParam::Asc => SortOrder::Asc,
            SortParam::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChirpResponse {
    pub author_id: u64,
    pub body: String,
    pub id: u64,
}

impl From<Post> for ChirpResponse {
    fn from(post: Post) -> Self {
        Self {
            author_id: post.author_id,
            body: post.body,
            id: post.id,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    caller: Authenticated,
    AppJson(req): AppJson<CreateChirpRequest>,
) -> Result<(StatusCode, Json<ChirpResponse>), ApiError> {
    let session = state.session.clone();
    let post = run_blocking(move || session.create_post(&caller, &req.body)).await?;

    tracing::debug!(id = post.id, author_id = post.author_id, "Created chirp");
    Ok((StatusCode::CREATED, Json(post.into())))
}

pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListChirpsParams>,
) -> Result<Json<Vec<ChirpResponse>>, ApiError> {
    let session = state.session.clone();
    let posts =
        run_blocking(move || session.list_posts(params.author_id, params.sort.into())).await?;

    Ok(Json(posts.into_iter().map(ChirpResponse::from).collect()))
}

pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<ChirpResponse>, ApiError> {
    let session = state.session.clone();
    let post = run_blocking(move || session.get_post(id))
        .await
        .map_err(|e| match e.status() {
            StatusCode::NOT_FOUND => ApiError::not_found("Chirp not found"),
            _ => e,
        })?;

    Ok(Json(post.into()))
}

/// Only the author may delete a chirp
pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    caller: Authenticated,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let session = state.session.clone();
    run_blocking(move || session.delete_post(&caller, id))
        .await
        .map_err(|e| match e.status() {
            StatusCode::NOT_FOUND => ApiError::not_found("Chirp not found"),
            StatusCode::FORBIDDEN => ApiError::forbidden("You can't delete this chirp"),
            _ => e,
        })?;

    tracing::debug!(id, "Deleted chirp");
    Ok(StatusCode::NO_CONTENT)
}
