//! Credential extraction from `Authorization` header values.

use thiserror::Error;

pub const BEARER_PREFIX: &str = "Bearer ";
pub const API_KEY_PREFIX: &str = "ApiKey ";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Malformed authorization header")]
pub struct MalformedHeaderError;

/// `Bearer <token>`, used by every user-facing session flow
pub fn bearer_token(header: Option<&str>) -> Result<&str, MalformedHeaderError> {
    strip_credential(header, BEARER_PREFIX)
}

/// `ApiKey <key>`, used only by the billing webhook
pub fn api_key(header: Option<&str>) -> Result<&str, MalformedHeaderError> {
    strip_credential(header, API_KEY_PREFIX)
}

fn strip_credential<'a>(
    header: Option<&'a str>,
    prefix: &str,
) -> Result<&'a str, MalformedHeaderError> {
    let credential = header
        .and_then(|value| value.strip_prefix(prefix))
        .map(str::trim)
        .ok_or(MalformedHeaderError)?;

    if credential.is_empty() {
        return Err(MalformedHeaderError);
    }
    Ok(credential)
}
