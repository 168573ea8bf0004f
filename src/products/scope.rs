//! Ownership scoping for product queries.
//!
//! Every single-product read, update and delete goes through an
//! [`OwnerScope`]. Admins get an unrestricted scope; everyone else is pinned
//! to their own user id, so a product owned by someone else looks exactly
//! like a product that does not exist.

use crate::auth::UserContext;
use crate::types::UserId;

/// Which products a request may address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    /// Any product, regardless of owner
    Unrestricted,
    /// Only products owned by this user
    Owner(UserId),
}

impl OwnerScope {
    /// Build the scope for an authenticated requester.
    pub fn for_requester(ctx: &UserContext) -> Self {
        if ctx.is_admin() {
            Self::Unrestricted
        } else {
            Self::Owner(ctx.user_id().clone())
        }
    }

    /// SurrealQL condition to append to a product statement. Binds `$owner`
    /// when restricted.
    pub fn filter(&self) -> &'static str {
        match self {
            Self::Unrestricted => "",
            Self::Owner(_) => "WHERE owner = $owner",
        }
    }

    pub fn owner(&self) -> Option<&UserId> {
        match self {
            Self::Unrestricted => None,
            Self::Owner(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{Role, UserProfile};

    fn ctx(id: &str, role: Role) -> UserContext {
        UserContext::new(UserProfile {
            id: UserId::new(id),
            email: format!("{}@x.com", id),
            name: None,
            role,
            created_at: None,
            updated_at: None,
        })
    }

    #[test]
    fn test_user_scope_is_pinned_to_owner() {
        let scope = OwnerScope::for_requester(&ctx("alice", Role::User));

        assert_eq!(scope, OwnerScope::Owner(UserId::new("alice")));
        assert_eq!(scope.filter(), "WHERE owner = $owner");
        assert_eq!(scope.owner(), Some(&UserId::new("alice")));
    }

    #[test]
    fn test_admin_scope_is_unrestricted() {
        let scope = OwnerScope::for_requester(&ctx("root", Role::Admin));

        assert_eq!(scope, OwnerScope::Unrestricted);
        assert_eq!(scope.filter(), "");
        assert!(scope.owner().is_none());
    }
}
