use axum::extract::State;
use axum::response::Html;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::AppState;

pub async fn healthz() -> &'static str {
    "OK"
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Html<String> {
    let hits = state.fileserver_hits.load(Ordering::Relaxed);

    Html(format!(
        "<html>\n\
         <body>\n\
         <h1>Welcome, Chirpy Admin</h1>\n\
         <p>Chirpy has been visited {hits} times!</p>\n\
         </body>\n\
         </html>\n"
    ))
}

pub async fn reset_metrics(State(state): State<Arc<AppState>>) -> &'static str {
    state.fileserver_hits.store(0, Ordering::Relaxed);
    tracing::info!("Fileserver hit counter reset");
    "Hits reset to 0"
}
