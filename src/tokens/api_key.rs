use super::header::{self, MalformedHeaderError};

/// Compare a presented key with the configured one without short-circuiting
/// on the first differing byte.
pub fn verify_api_key(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extract the `ApiKey` credential from a header and check it.
///
/// `Ok(false)` means the header was well formed but the key is wrong.
pub fn authenticate(header: Option<&str>, expected: &str) -> Result<bool, MalformedHeaderError> {
    let presented = header::api_key(header)?;
    Ok(verify_api_key(presented, expected))
}
