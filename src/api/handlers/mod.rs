mod admin;
mod chirps;
mod sessions;
mod users;
mod webhooks;

use serde::Serialize;

use crate::api::response::ApiError;
use crate::session::SessionError;
use crate::storage::models::User;

pub use admin::{healthz, metrics, reset_metrics};
pub use chirps::{create_chirp, delete_chirp, get_chirp, list_chirps};
pub use sessions::{login, refresh, revoke};
pub use users::{create_user, update_user};
pub use webhooks::polka_webhook;

/// Public view of a user; the password hash never leaves the server
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: u64,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            id: user.id,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Run a workflow on the blocking pool.
///
/// Store calls do synchronous file I/O and password hashing is CPU-bound, so
/// neither may run on a runtime worker.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, SessionError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("Worker task failed: {e}")))?
        .map_err(ApiError::from)
}
