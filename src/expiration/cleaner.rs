use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::AppState;

/// Start the background expiration cleaner task
pub fn start_expiration_cleaner(state: Arc<AppState>) -> JoinHandle<()> {
    let interval = Duration::from_secs(state.config.tokens.cleanup_interval_seconds);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);

        loop {
            interval_timer.tick().await;
            run_cleanup(&state).await;
        }
    })
}

/// Purge expired refresh tokens once. Returns how many were removed.
pub async fn run_cleanup(state: &AppState) -> usize {
    debug!("Running expiration cleanup");

    let tokens = state.session.tokens().clone();
    let result = tokio::task::spawn_blocking(move || tokens.cleanup_expired()).await;

    match result {
        Ok(Ok(count)) => {
            if count > 0 {
                debug!(refresh_tokens_cleaned = count, "Expired refresh tokens cleaned");
            }
            count
        }
        Ok(Err(e)) => {
            error!(error = %e, "Failed to clean up expired refresh tokens");
            0
        }
        Err(e) => {
            error!(error = %e, "Expiration cleanup task panicked");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_refresh_token, test_state};

    #[tokio::test]
    async fn test_run_cleanup_purges_expired() {
        let (state, _temp) = test_state();
        let store = state.session.store();
        store
            .put_refresh_token(&make_refresh_token("stale", 1, chrono::Duration::seconds(-1)))
            .unwrap();
        let live = state.session.tokens().issue_refresh(1).unwrap();

        assert_eq!(run_cleanup(&state).await, 1);
        assert_eq!(run_cleanup(&state).await, 0);
        assert!(store.get_refresh_token(&live).unwrap().is_some());
    }
}
