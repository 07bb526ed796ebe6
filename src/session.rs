//! Session and account workflows.
//!
//! Every authenticated operation runs the same ordered steps: authenticate the
//! caller, validate the request, then touch the store. Each step is its own
//! function so it can be tested and reused on its own.

use thiserror::Error;

use crate::auth::{hash_password, verify_password, PasswordError};
use crate::content::{clean_body, MAX_CHIRP_LEN};
use crate::storage::models::{Post, User};
use crate::storage::{Store, StoreError};
use crate::tokens::{api_key, bearer_token, MalformedHeaderError, TokenError, TokenService};

/// Event name the Polka webhook sends for a paid upgrade
pub const UPGRADE_EVENT: &str = "user.upgraded";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not allowed to modify this resource")]
    Forbidden,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    MalformedHeader(#[from] MalformedHeaderError),
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[error("{0}")]
    Validation(String),
}

/// A caller whose bearer access token has been verified.
///
/// Only [`SessionManager::authenticate`] can build one, so any workflow taking
/// it cannot run before authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated {
    user_id: u64,
}

impl Authenticated {
    pub fn user_id(&self) -> u64 {
        self.user_id
    }
}

/// The billing webhook, after its API key matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookCaller {
    _verified: (),
}

/// Tokens handed out on a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event was not an upgrade and was acknowledged without changes
    Ignored,
    Upgraded(User),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Ties credential checks and token issuance to the store
#[derive(Clone)]
pub struct SessionManager {
    polka_key: String,
    store: Store,
    tokens: TokenService,
}

impl SessionManager {
    pub fn new(store: Store, tokens: TokenService, polka_key: impl Into<String>) -> Self {
        Self {
            polka_key: polka_key.into(),
            store,
            tokens,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    // ========================================================================
    // Credentials
    // ========================================================================

    pub fn register(&self, email: &str, password: &str) -> Result<User, SessionError> {
        validate_credentials(email, password)?;

        let hashed = hash_password(password)?;
        let user = self.store.create_user(email, &hashed)?;

        tracing::debug!(user_id = user.id, "Registered user");
        Ok(user)
    }

    /// Check email and password and issue an access/refresh token pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        validate_credentials(email, password)?;

        let user = match self.store.get_user_by_email(email) {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(SessionError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        if !verify_password(password, &user.hashed_password)? {
            return Err(SessionError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access(user.id, self.tokens.access_ttl())?;
        let refresh_token = self.tokens.issue_refresh(user.id)?;

        tracing::debug!(user_id = user.id, "User logged in");
        Ok(LoginOutcome {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Exchange the bearer refresh token for a new access token
    pub fn refresh(&self, authorization: Option<&str>) -> Result<String, SessionError> {
        let token = bearer_token(authorization)?;
        let user_id = self.tokens.validate_refresh(token)?;

        Ok(self.tokens.issue_access(user_id, self.tokens.access_ttl())?)
    }

    /// Revoke the bearer refresh token. Succeeds for unknown or already revoked tokens.
    pub fn revoke(&self, authorization: Option<&str>) -> Result<(), SessionError> {
        let token = bearer_token(authorization)?;
        self.tokens.revoke(token)?;
        Ok(())
    }

    /// Verify the bearer access token
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Authenticated, SessionError> {
        let token = bearer_token(authorization)?;
        let user_id = self.tokens.validate_access(token)?;
        Ok(Authenticated { user_id })
    }

    /// Verify the `ApiKey` credential of the billing webhook
    pub fn authenticate_webhook(
        &self,
        authorization: Option<&str>,
    ) -> Result<WebhookCaller, SessionError> {
        if !api_key::authenticate(authorization, &self.polka_key)? {
            return Err(SessionError::InvalidCredentials);
        }
        Ok(WebhookCaller { _verified: () })
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Replace the caller's email and password
    pub fn update_user(
        &self,
        caller: &Authenticated,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        validate_credentials(email, password)?;

        let hashed = hash_password(password)?;
        Ok(self.store.update_user(caller.user_id, email, &hashed)?)
    }

    /// Apply a Polka event. Anything but an upgrade is acknowledged and ignored.
    pub fn handle_webhook(
        &self,
        _caller: &WebhookCaller,
        event: &str,
        user_id: u64,
    ) -> Result<WebhookOutcome, SessionError> {
        if event != UPGRADE_EVENT {
            return Ok(WebhookOutcome::Ignored);
        }

        let user = self.store.upgrade_account(user_id)?;
        tracing::info!(user_id, "Upgraded account");
        Ok(WebhookOutcome::Upgraded(user))
    }

    // ========================================================================
    // Posts
    // ========================================================================

    pub fn create_post(&self, caller: &Authenticated, body: &str) -> Result<Post, SessionError> {
        let body = validate_chirp(body)?;
        Ok(self.store.create_post(&body, caller.user_id)?)
    }

    /// Delete a post owned by the caller.
    ///
    /// The store itself does no ownership check; this is where it happens.
    pub fn delete_post(&self, caller: &Authenticated, post_id: u64) -> Result<(), SessionError> {
        let post = self.store.get_post(post_id)?;
        if post.author_id != caller.user_id {
            return Err(SessionError::Forbidden);
        }

        Ok(self.store.delete_post(post_id)?)
    }

    pub fn get_post(&self, post_id: u64) -> Result<Post, SessionError> {
        Ok(self.store.get_post(post_id)?)
    }

    /// Posts filtered by author and sorted by id
    pub fn list_posts(
        &self,
        author_id: Option<u64>,
        order: SortOrder,
    ) -> Result<Vec<Post>, SessionError> {
        let mut posts: Vec<Post> = self
            .store
            .get_posts()?
            .into_iter()
            .filter(|p| author_id.is_none_or(|id| p.author_id == id))
            .collect();

        match order {
            SortOrder::Asc => posts.sort_by_key(|p| p.id),
            SortOrder::Desc => posts.sort_by_key(|p| std::cmp::Reverse(p.id)),
        }
        Ok(posts)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), SessionError> {
    if email.trim().is_empty() {
        return Err(SessionError::Validation("Email is empty".to_string()));
    }
    if password.is_empty() {
        return Err(SessionError::Validation("Password is empty".to_string()));
    }
    Ok(())
}

/// Check length and mask profanity
fn validate_chirp(body: &str) -> Result<String, SessionError> {
    if body.trim().is_empty() {
        return Err(SessionError::Validation("Body is empty".to_string()));
    }
    if body.len() > MAX_CHIRP_LEN {
        return Err(SessionError::Validation("Chirp is too long".to_string()));
    }
    Ok(clean_body(body))
}
