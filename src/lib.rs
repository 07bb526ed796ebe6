//! chirpy - A tiny social-posting backend
//!
//! This crate provides:
//! - Argon2id password hashing
//! - Stateless JWT access tokens and store-backed opaque refresh tokens
//! - Idempotent refresh-token revocation with background expiry cleanup
//! - A single-file JSON document store with atomic rewrites and locked
//!   read-modify-write cycles
//! - REST API for users, chirps and the Polka upgrade webhook

pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod expiration;
pub mod session;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use std::sync::atomic::AtomicU64;

use config::Config;
use session::SessionManager;

/// Shared application state
pub struct AppState {
    pub config: Config,
    /// Requests served under `/app` since start or last reset
    pub fileserver_hits: AtomicU64,
    pub session: SessionManager,
}

impl AppState {
    pub fn new(config: Config, session: SessionManager) -> Self {
        Self {
            config,
            fileserver_hits: AtomicU64::new(0),
            session,
        }
    }
}
