use rand::Rng;

/// Length of a hex-encoded refresh token (32 random bytes)
pub const REFRESH_TOKEN_LEN: usize = 64;

/// Generate a secure random token (32 bytes, hex encoded = 64 characters)
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

/// Whether a string has the shape of a refresh token.
///
/// Refresh tokens are opaque, but their alphabet never contains the `.`
/// separators of a JWT, so the two kinds cannot be confused.
pub fn looks_like_refresh_token(token: &str) -> bool {
    token.len() == REFRESH_TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}
