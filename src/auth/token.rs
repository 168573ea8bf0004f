//! Identity token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the server secret. The payload carries
//! the user id in `sub` plus `iat`/`exp`; nothing else is trusted from it.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::extractor::{AuthConfig, AuthError};
use crate::types::UserId;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued-at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Signs and verifies identity tokens with a shared secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No grace period: a token is dead the second its exp passes.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl_seconds: config.token_ttl_seconds,
        }
    }

    /// Issue a token for the given user, valid from now.
    pub fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
        self.issue_at(user_id, now_unix())
    }

    /// Issue a token as if it had been minted at `issued_at`.
    pub fn issue_at(&self, user_id: &UserId, issued_at: u64) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_seconds),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the claims on success.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let claims = token_data.claims;

        // Additional expiration check (jsonwebtoken does this, but be explicit)
        if claims.exp <= now_unix() {
            return Err(AuthError::TokenExpired);
        }

        debug!("token verified for subject: {}", claims.sub);
        Ok(claims)
    }
}

fn now_unix() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, ttl: u64) -> TokenService {
        TokenService::new(&AuthConfig::new(secret, ttl))
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service("test-secret", 3600);
        let token = tokens.issue(&UserId::new("u1")).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service("test-secret", 60);
        let token = tokens
            .issue_at(&UserId::new("u1"), now_unix() - 120)
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_token_expiring_now_rejected() {
        let tokens = service("test-secret", 60);
        let token = tokens.issue_at(&UserId::new("u1"), now_unix() - 60).unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = service("secret-a", 3600);
        let verifier = service("secret-b", 3600);
        let token = issuer.issue(&UserId::new("u1")).unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = service("test-secret", 3600);
        let token = tokens.issue(&UserId::new("u1")).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = "eyJzdWIiOiJ1MiIsImlhdCI6MCwiZXhwIjo5OTk5OTk5OTk5fQ";
        parts[1] = forged_payload;
        let forged = parts.join(".");

        assert!(tokens.verify(&forged).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service("test-secret", 3600);
        assert!(matches!(
            tokens.verify("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
