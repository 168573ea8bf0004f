//! Authentication and user context module.
//!
//! Identity is established once per request at the HTTP layer and carried as
//! a [`UserContext`] extension from then on.
//!
//! - **Tokens**: HS256 JWTs naming the user id, issued on register/login
//! - **Passwords**: Argon2 hashes, written only by [`UserStore`]
//! - **Roles**: `user` or `admin`, enforced per route group by [`RoleGate`]
//!
//! ## Security Model
//!
//! - Every token is re-checked against the user table, so deleted users and
//!   role changes take effect on the next request
//! - Product queries are scoped by owner unless the requester is an admin
//! - Password hashes never leave the store; responses use `UserProfile`
//!
//! ## Usage
//!
//! ```ignore
//! let extractor = Arc::new(AuthExtractor::new(tokens, users));
//! let ctx = extractor.extract_user(Some("Bearer eyJ...")).await?;
//! let scope = OwnerScope::for_requester(&ctx);
//! ```

mod context;
mod extractor;
mod middleware;
mod password;
mod token;
mod user_store;

pub use context::UserContext;
pub use extractor::{AuthConfig, AuthError, AuthExtractor, DEFAULT_TOKEN_TTL_SECONDS, bearer_token};
pub use middleware::{RoleGate, auth_layer, role_gate};
pub use password::{hash_password, verify_password};
pub use token::{TokenClaims, TokenService};
pub use user_store::{DuplicateEmail, UserChanges, UserStore, normalize_email};
