//! Shared test helpers available to all `#[cfg(test)]` modules in the crate.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use crate::config::{AuthConfig, Config, ServerConfig, TokenConfig};
use crate::session::SessionManager;
use crate::storage::models::RefreshToken;
use crate::storage::Store;
use crate::tokens::TokenService;
use crate::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_POLKA_KEY: &str = "test-polka-key";

/// Open a fresh store in a temporary directory.
///
/// Returns both the `Store` and the `TempDir` guard; the caller must keep the
/// `TempDir` alive for the duration of the test.
pub fn setup_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path().join("database.json")).unwrap();
    (store, temp_dir)
}

/// A minimal `Config` suitable for unit tests.
pub fn test_config() -> Config {
    Config {
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            polka_key: TEST_POLKA_KEY.to_string(),
        },
        server: ServerConfig {
            bind_address: "127.0.0.1:8080".to_string(),
            database_path: "/tmp/test/database.json".to_string(),
            fileserver_root: ".".to_string(),
        },
        tokens: TokenConfig::default(),
    }
}

/// A `SessionManager` over a fresh store, wired with [`test_config`].
pub fn setup_session() -> (SessionManager, TempDir) {
    let (store, temp_dir) = setup_store();
    let config = test_config();
    let tokens = TokenService::new(&config.auth.jwt_secret, store.clone(), &config.tokens);
    (
        SessionManager::new(store, tokens, config.auth.polka_key),
        temp_dir,
    )
}

/// Build a full `Arc<AppState>` over a fresh store.
pub fn test_state() -> (Arc<AppState>, TempDir) {
    let (session, temp_dir) = setup_session();
    (Arc::new(AppState::new(test_config(), session)), temp_dir)
}

/// Create a `RefreshToken` record for `user_id` expiring `ttl` from now.
pub fn make_refresh_token(token: &str, user_id: u64, ttl: Duration) -> RefreshToken {
    let now = Utc::now();
    RefreshToken {
        created_at: now,
        expires_at: now + ttl,
        token: token.to_string(),
        user_id,
    }
}
