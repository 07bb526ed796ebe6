pub mod db;
pub mod models;
mod posts;
mod refresh_tokens;
mod users;

pub use db::{Store, StoreError};
