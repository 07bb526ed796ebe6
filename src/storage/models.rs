use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    /// Argon2 PHC string, never the plaintext
    pub hashed_password: String,
    pub id: u64,
    /// Set by the Polka billing webhook
    #[serde(default)]
    pub is_chirpy_red: bool,
}

/// A chirp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub author_id: u64,
    pub body: String,
    pub id: u64,
}

/// An issued refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Opaque secret value (32-byte hex)
    pub token: String,
    pub user_id: u64,
}

impl RefreshToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The whole persisted state, serialized as one JSON document.
///
/// Identifier counters hold the last id handed out; they only ever grow, so
/// deleted posts never have their id reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub last_post_id: u64,
    #[serde(default)]
    pub last_user_id: u64,
    #[serde(default)]
    pub posts: BTreeMap<u64, Post>,
    #[serde(default)]
    pub refresh_tokens: BTreeMap<String, RefreshToken>,
    /// Revocation set: refresh token -> when it was revoked
    #[serde(default)]
    pub revocations: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub users: BTreeMap<u64, User>,
}

impl Document {
    pub(crate) fn next_user_id(&mut self) -> u64 {
        self.last_user_id += 1;
        self.last_user_id
    }

    pub(crate) fn next_post_id(&mut self) -> u64 {
        self.last_post_id += 1;
        self.last_post_id
    }
}
