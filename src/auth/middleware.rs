//! Axum middleware for authentication and role checks.
//!
//! [`auth_layer`] resolves the bearer token into a [`UserContext`] and stores
//! it as a request extension. [`role_gate`] runs after it and rejects users
//! whose role is not on the allow list.
//!
//! ```ignore
//! Router::new()
//!     .route("/admin/users", get(list_users))
//!     .route_layer(from_fn_with_state(RoleGate::admin_only(), role_gate))
//!     .route_layer(from_fn_with_state(extractor, auth_layer));
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::auth::context::UserContext;
use crate::auth::extractor::AuthExtractor;
use crate::db::schema::Role;

/// Authenticate the request or short-circuit with 401.
pub async fn auth_layer(
    State(extractor): State<Arc<AuthExtractor>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match extractor.extract_user(authorization).await {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "authentication failed");
            ApiError::from(e).into_response()
        }
    }
}

/// Allow list of roles for a group of routes.
#[derive(Debug, Clone)]
pub struct RoleGate {
    allowed: Vec<Role>,
}

impl RoleGate {
    /// An empty list admits nobody.
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn admin_only() -> Self {
        Self::new([Role::Admin])
    }

    /// 403 unless a user is attached and their role is allowed.
    pub fn check(&self, ctx: Option<&UserContext>) -> Result<(), ApiError> {
        let ctx = ctx.ok_or(ApiError::Forbidden)?;

        if self.allowed.contains(&ctx.role()) {
            Ok(())
        } else {
            warn!(user_id = %ctx.user_id(), role = %ctx.role(), "role not permitted");
            Err(ApiError::Forbidden)
        }
    }
}

pub async fn role_gate(
    State(gate): State<RoleGate>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match gate.check(request.extensions().get::<UserContext>()) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::UserProfile;
    use crate::types::UserId;
    use axum::http::StatusCode;

    fn ctx(role: Role) -> UserContext {
        UserContext::new(UserProfile {
            id: UserId::new("u1"),
            email: "u1@x.com".to_string(),
            name: None,
            role,
            created_at: None,
            updated_at: None,
        })
    }

    #[test]
    fn test_admin_gate() {
        let gate = RoleGate::admin_only();

        assert!(gate.check(Some(&ctx(Role::Admin))).is_ok());

        let err = gate.check(Some(&ctx(Role::User))).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Access denied");
    }

    #[test]
    fn test_gate_without_user_is_forbidden() {
        let err = RoleGate::admin_only().check(None).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_multi_role_and_empty_gate() {
        let gate = RoleGate::new(Role::ALL);
        assert!(gate.check(Some(&ctx(Role::User))).is_ok());
        assert!(gate.check(Some(&ctx(Role::Admin))).is_ok());

        let closed = RoleGate::new([]);
        assert!(closed.check(Some(&ctx(Role::Admin))).is_err());
    }
}
