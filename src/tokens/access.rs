//! Signed JWT access tokens (HS256).

use jsonwebtoken::{
    errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

pub const ISSUER: &str = "chirpy";

/// Token kind carried in the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    /// Stringified user id
    pub sub: String,
    pub typ: TokenType,
}

/// Signing material derived from the shared secret
pub struct JwtKeys {
    decoding: DecodingKey,
    encoding: EncodingKey,
    /// Full validation, no leeway on `exp`
    strict: Validation,
    /// Signature and issuer only; used to classify a token, never to accept it
    lenient: Validation,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut strict = Validation::new(Algorithm::HS256);
        strict.leeway = 0;
        strict.set_issuer(&[ISSUER]);
        strict.set_required_spec_claims(&["exp", "iss", "sub"]);

        let mut lenient = strict.clone();
        lenient.validate_exp = false;

        Self {
            decoding: DecodingKey::from_secret(secret),
            encoding: EncodingKey::from_secret(secret),
            strict,
            lenient,
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    /// Verify signature, issuer and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.strict).map(|data| data.claims)
    }

    /// Verify signature and issuer, ignoring expiry
    pub fn inspect(&self, token: &str) -> Result<Claims, JwtError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.lenient).map(|data| data.claims)
    }
}
