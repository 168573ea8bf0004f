//! User context for request-scoped identity.

use serde::{Deserialize, Serialize};

use crate::db::schema::{Role, UserProfile};
use crate::types::UserId;

/// The authenticated user attached to a request.
///
/// Built by the auth layer from a verified token and a fresh user lookup,
/// then read by the role gate and handlers. It holds the profile only; the
/// password hash never enters the request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    profile: UserProfile,
}

impl UserContext {
    /// Create a new user context.
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }

    /// Get the user ID.
    pub fn user_id(&self) -> &UserId {
        &self.profile.id
    }

    /// Get the user's role.
    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn is_admin(&self) -> bool {
        self.profile.role == Role::Admin
    }

    pub fn into_profile(self) -> UserProfile {
        self.profile
    }
}
