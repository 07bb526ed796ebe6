//! Request authentication extractors and the fileserver hit counter.
//!
//! The extractors run before any body extractor in a handler's argument list,
//! so a request is authenticated before its body is parsed.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::response::ApiError;
use crate::session::{Authenticated, WebhookCaller};
use crate::AppState;

/// Raw `Authorization` header value, if present and valid UTF-8
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state
            .session
            .authenticate(authorization(&parts.headers))
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                ApiError::unauthorized("Couldn't validate JWT")
            })
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for WebhookCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state
            .session
            .authenticate_webhook(authorization(&parts.headers))
            .map_err(|_| ApiError::unauthorized("API key is invalid"))
    }
}

/// Count every request that reaches the static file server
pub async fn count_fileserver_hits(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    state.fileserver_hits.fetch_add(1, Ordering::Relaxed);
    next.run(request).await
}
