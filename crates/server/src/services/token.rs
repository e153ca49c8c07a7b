//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a single server-side secret. The claims
//! carry the user's identity and role; role changes therefore take effect on
//! the next login, which matches the dashboard's session model.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use enquiry_desk_core::{Email, Role, UserId};

use crate::models::{CurrentUser, User};

/// Errors from token issuance or verification.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token is malformed, has a bad signature, or invalid claims.
    #[error("Invalid token")]
    Invalid,

    /// A token could not be signed.
    #[error("Failed to sign token")]
    Signing,
}

/// Claims carried by an issued token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user's ID.
    sub: i32,
    /// User's email at issue time.
    email: Email,
    /// User's role at issue time.
    role: Role,
    /// Issued-at (seconds since epoch).
    iat: i64,
    /// Expiry (seconds since epoch).
    exp: i64,
}

/// Issues and verifies bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_days: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Signing)
    }

    /// Verify a token and extract the acting user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for an out-of-date token and
    /// `TokenError::Invalid` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<CurrentUser, TokenError> {
        let validation = Validation::default();

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        let claims = data.claims;
        Ok(CurrentUser {
            id: UserId::new(claims.sub),
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret.to_owned()), 7)
    }

    fn sample_user() -> User {
        User {
            id: UserId::new(42),
            name: "Admin".to_owned(),
            email: Email::parse("admin@example.com").unwrap(),
            role: Role::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let tokens = service("k9#mQ2$vL8@nR5!xT3&wY7*zB4^cF6(j");
        let token = tokens.issue(&sample_user()).unwrap();

        let current = tokens.verify(&token).unwrap();
        assert_eq!(current.id, UserId::new(42));
        assert_eq!(current.email.as_str(), "admin@example.com");
        assert_eq!(current.role, Role::Admin);
    }

    #[test]
    fn verify_rejects_garbage() {
        let tokens = service("k9#mQ2$vL8@nR5!xT3&wY7*zB4^cF6(j");
        assert!(matches!(
            tokens.verify("not-a-token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let issuer = service("k9#mQ2$vL8@nR5!xT3&wY7*zB4^cF6(j");
        let verifier = service("Different$ecret!Entirely#0987654321");

        let token = issuer.issue(&sample_user()).unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn verify_rejects_expired_token() {
        // A negative TTL puts the expiry in the past, beyond the leeway.
        let tokens = TokenService::new(
            &SecretString::from("k9#mQ2$vL8@nR5!xT3&wY7*zB4^cF6(j".to_owned()),
            -1,
        );
        let token = tokens.issue(&sample_user()).unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let tokens = service("k9#mQ2$vL8@nR5!xT3&wY7*zB4^cF6(j");
        let mut token = tokens.issue(&sample_user()).unwrap();
        // Flip a character in the payload segment.
        let mid = token.len() / 2;
        let replacement = if token.as_bytes().get(mid) == Some(&b'a') { "b" } else { "a" };
        token.replace_range(mid..=mid, replacement);

        assert!(tokens.verify(&token).is_err());
    }
}
