use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

use crate::config::TokenConfig;
use crate::storage::models::RefreshToken;
use crate::storage::{Store, StoreError};

use super::access::{Claims, JwtKeys, TokenType, ISSUER};
use super::generator::{generate_token, looks_like_refresh_token};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Token lifetime out of range")]
    LifetimeOverflow,
    #[error("Token revoked")]
    Revoked,
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Unknown token")]
    Unknown,
    #[error("Wrong token type")]
    WrongType,
}

/// Issues and validates access and refresh tokens.
///
/// Access tokens are stateless JWTs. Refresh tokens are opaque values whose
/// validity lives in the [`Store`].
#[derive(Clone)]
pub struct TokenService {
    access_ttl: Duration,
    keys: Arc<JwtKeys>,
    refresh_ttl: Duration,
    store: Store,
}

impl TokenService {
    pub fn new(secret: &str, store: Store, config: &TokenConfig) -> Self {
        Self {
            access_ttl: ttl_from_seconds(config.access_ttl_seconds),
            keys: Arc::new(JwtKeys::from_secret(secret.as_bytes())),
            refresh_ttl: ttl_from_seconds(config.refresh_ttl_seconds),
            store,
        }
    }

    /// Default lifetime of access tokens
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Sign an access token for `user_id` valid for `ttl`
    pub fn issue_access(&self, user_id: u64, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            exp: expiry(now, ttl)?.timestamp(),
            iat: now.timestamp(),
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            typ: TokenType::Access,
        };

        self.keys.sign(&claims).map_err(TokenError::Signing)
    }

    /// Generate a refresh token and record it for `user_id`
    pub fn issue_refresh(&self, user_id: u64) -> Result<String, TokenError> {
        let now = Utc::now();
        let record = RefreshToken {
            created_at: now,
            expires_at: expiry(now, self.refresh_ttl)?,
            token: generate_token(),
            user_id,
        };

        self.store.put_refresh_token(&record)?;
        tracing::debug!(user_id, expires_at = %record.expires_at, "Issued refresh token");

        Ok(record.token)
    }

    /// Check signature, type and expiry of an access token and return its subject
    pub fn validate_access(&self, token: &str) -> Result<u64, TokenError> {
        if looks_like_refresh_token(token) {
            return Err(TokenError::WrongType);
        }

        let claims = self.keys.verify(token).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        if claims.typ != TokenType::Access {
            return Err(TokenError::WrongType);
        }

        claims.sub.parse().map_err(|_| TokenError::Invalid)
    }

    /// Look up a refresh token and return the user it was issued to.
    ///
    /// A revoked token stays revoked even after it would have expired.
    pub fn validate_refresh(&self, token: &str) -> Result<u64, TokenError> {
        if self.is_signed_access_token(token) {
            return Err(TokenError::WrongType);
        }

        let (record, revoked_at) = self
            .store
            .get_refresh_token(token)?
            .ok_or(TokenError::Unknown)?;

        if revoked_at.is_some() {
            return Err(TokenError::Revoked);
        }
        if record.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(record.user_id)
    }

    /// Revoke a refresh token.
    ///
    /// Revoking an unknown or already revoked token succeeds without changing
    /// anything. Returns true when this call revoked the token.
    pub fn revoke(&self, token: &str) -> Result<bool, TokenError> {
        let revoked = self.store.revoke_refresh_token(token, Utc::now())?;
        if revoked {
            tracing::debug!("Revoked refresh token");
        }
        Ok(revoked)
    }

    /// Drop expired refresh-token records (called by background task)
    pub fn cleanup_expired(&self) -> Result<usize, TokenError> {
        let cleaned = self.store.purge_expired_refresh_tokens(Utc::now())?;

        if cleaned > 0 {
            tracing::info!(count = cleaned, "Cleaned up expired refresh tokens");
        }

        Ok(cleaned)
    }

    fn is_signed_access_token(&self, token: &str) -> bool {
        matches!(self.keys.inspect(token), Ok(claims) if claims.typ == TokenType::Access)
    }
}

/// Saturates instead of wrapping; `expiry` rejects what does not fit
fn ttl_from_seconds(seconds: u64) -> Duration {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, TokenError> {
    now.checked_add_signed(ttl).ok_or(TokenError::LifetimeOverflow)
}
