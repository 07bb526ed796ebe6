use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::count_fileserver_hits;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Static files, counted for /admin/metrics
    let fileserver = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.server.fileserver_root))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            count_fileserver_hits,
        ));

    let api_routes = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/reset", get(handlers::reset_metrics))
        .route(
            "/chirps",
            get(handlers::list_chirps).post(handlers::create_chirp),
        )
        .route(
            "/chirps/:id",
            get(handlers::get_chirp).delete(handlers::delete_chirp),
        )
        .route(
            "/users",
            post(handlers::create_user).put(handlers::update_user),
        )
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/revoke", post(handlers::revoke))
        .route("/polka/webhooks", post(handlers::polka_webhook));

    let admin_routes = Router::new().route("/metrics", get(handlers::metrics));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .merge(fileserver)
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
