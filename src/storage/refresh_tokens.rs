use chrono::{DateTime, Utc};

use super::db::{Store, StoreError};
use super::models::{Document, RefreshToken};

impl Store {
    // ========================================================================
    // Refresh token operations
    // ========================================================================

    /// Record an issued refresh token
    pub fn put_refresh_token(&self, record: &RefreshToken) -> Result<(), StoreError> {
        debug_assert!(!record.token.is_empty(), "refresh token must not be empty");

        self.write(|doc| {
            if doc.refresh_tokens.contains_key(&record.token) {
                return Err(StoreError::AlreadyExists);
            }
            doc.refresh_tokens.insert(record.token.clone(), record.clone());
            Ok(())
        })
    }

    /// Look up an issued refresh token together with its revocation time
    pub fn get_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<(RefreshToken, Option<DateTime<Utc>>)>, StoreError> {
        self.read(|doc| {
            Ok(doc
                .refresh_tokens
                .get(token)
                .map(|record| (record.clone(), doc.revocations.get(token).copied())))
        })
    }

    /// Add a token to the revocation set.
    ///
    /// Idempotent: unknown tokens and tokens already revoked are left as they
    /// are, and the first revocation time is kept. Returns true only when this
    /// call revoked the token.
    pub fn revoke_refresh_token(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let revocable = |doc: &Document| {
            doc.refresh_tokens.contains_key(token) && !doc.revocations.contains_key(token)
        };

        // Skip the rewrite for the no-op case
        if !self.read(|doc| Ok(revocable(doc)))? {
            return Ok(false);
        }

        // Re-check under the write lock, another worker may have revoked it first
        self.write(|doc| {
            if !revocable(doc) {
                return Ok(false);
            }
            doc.revocations.insert(token.to_string(), at);
            Ok(true)
        })
    }

    /// Revocation time of a token, if it has been revoked
    pub fn revoked_at(&self, token: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.read(|doc| Ok(doc.revocations.get(token).copied()))
    }

    /// Drop expired refresh tokens and their revocation entries
    pub fn purge_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let any_expired = self.read(|doc| {
            Ok(doc
                .refresh_tokens
                .values()
                .any(|record| record.is_expired_at(now)))
        })?;
        if !any_expired {
            return Ok(0);
        }

        self.write(|doc| {
            let expired: Vec<String> = doc
                .refresh_tokens
                .values()
                .filter(|record| record.is_expired_at(now))
                .map(|record| record.token.clone())
                .collect();

            for token in &expired {
                doc.refresh_tokens.remove(token);
                doc.revocations.remove(token);
            }
            Ok(expired.len())
        })
    }
}
