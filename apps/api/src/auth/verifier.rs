//! Bearer token verification.
//!
//! This is the single authorization choke-point: the REST extractor and the
//! realtime gateway both call [`TokenVerifier::verify`] on the same instance,
//! so the two paths cannot drift apart.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// The authenticated identity derived from a verified credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
}

/// Why verification failed. The reason is safe to echo back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthFailure {
    pub reason: &'static str,
}

/// Claims carried by tokens the auth service issues.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The principal's user id.
    pub sub: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Validates HS256 bearer tokens. Side-effect-free; the principal comes from
/// the verified claims, never from a storage lookup.
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthFailure> {
        if token.trim().is_empty() {
            return Err(AuthFailure {
                reason: "Missing token",
            });
        }

        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(Principal {
                user_id: data.claims.sub,
            }),
            Err(err) => {
                let reason = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidSignature => "Invalid token signature",
                    _ => "Invalid token",
                };
                Err(AuthFailure { reason })
            }
        }
    }
}
