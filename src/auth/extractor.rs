//! Authentication extractor for HTTP requests.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::context::UserContext;
use crate::auth::token::TokenService;
use crate::auth::user_store::UserStore;
use crate::types::UserId;

/// Default token lifetime in seconds (7 days).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Authentication configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify tokens
    pub jwt_secret: String,
    /// Lifetime of issued tokens in seconds
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

fn default_token_ttl_seconds() -> u64 {
    DEFAULT_TOKEN_TTL_SECONDS
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_seconds: u64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_seconds,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[redacted]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

/// Authentication errors.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No bearer token on the request
    MissingToken,
    /// Malformed token or signature mismatch
    InvalidToken(String),
    /// Token is past its expiry
    TokenExpired,
    /// Token names a user that no longer exists
    UnknownUser,
    /// Database error
    DatabaseError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "Authentication required"),
            Self::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            Self::TokenExpired => write!(f, "Token has expired"),
            Self::UnknownUser => write!(f, "User not found"),
            Self::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Resolves the `Authorization` header of a request into a [`UserContext`].
pub struct AuthExtractor {
    tokens: Arc<TokenService>,
    user_store: Arc<UserStore>,
}

impl AuthExtractor {
    /// Create a new auth extractor.
    pub fn new(tokens: Arc<TokenService>, user_store: Arc<UserStore>) -> Self {
        Self { tokens, user_store }
    }

    /// Extract user context from the `Authorization` header value.
    ///
    /// Fails closed: every path that does not end in a verified token and an
    /// existing user is an error.
    pub async fn extract_user(&self, authorization: Option<&str>) -> Result<UserContext, AuthError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;

        let claims = self.tokens.verify(token)?;

        // Always reload: role changes and deletions take effect immediately.
        let user = self
            .user_store
            .get_user(&UserId::new(claims.sub))
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UnknownUser)?;

        debug!(user_id = %user.uid, role = %user.role, "request authenticated");

        Ok(UserContext::new(user.into()))
    }
}

/// Pull the token out of a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
