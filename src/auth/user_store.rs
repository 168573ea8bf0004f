//! User storage and management.
//!
//! This is the only place that writes `password_hash`: every path that
//! accepts a plaintext password hashes it here before it reaches the
//! database.

use anyhow::Result;
use tracing::{debug, info};

use crate::auth::password::{hash_password, verify_password};
use crate::db::Db;
use crate::db::schema::{Role, UserCreate, UserPatch, UserRecord};
use crate::types::UserId;

/// Unique index on `user.email`, defined in `ensure_schema`.
const EMAIL_INDEX: &str = "user_email";

/// Returned when an email is already registered to another account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("User already exists")]
pub struct DuplicateEmail;

/// Changes to apply to a user. `password` is plaintext and gets hashed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Canonical form of an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User store for database operations.
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create a new user store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a new user, hashing the password.
    ///
    /// Fails with [`DuplicateEmail`] if the address is taken, whether that is
    /// caught by the lookup or by the unique index under a race.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
        role: Role,
    ) -> Result<UserRecord> {
        let email = normalize_email(email);

        if self.find_by_email(&email).await?.is_some() {
            return Err(DuplicateEmail.into());
        }

        let create = UserCreate {
            uid: UserId::generate(),
            email,
            password_hash: hash_password(password)?,
            name: name.map(|s| s.to_string()),
            role,
        };

        let query = "CREATE type::thing('user', $uid) CONTENT $data";

        let mut res = self
            .db
            .query(query)
            .bind(("uid", create.uid.clone()))
            .bind(("data", create))
            .await?;

        let users: Vec<UserRecord> = res.take(0).map_err(unique_violation)?;
        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create user"))?;

        info!(user_id = %user.uid, role = %user.role, "user created");
        Ok(user)
    }

    /// Get a user by email (normalized before lookup).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let query = "SELECT * FROM user WHERE email = $email LIMIT 1";

        let mut res = self
            .db
            .query(query)
            .bind(("email", normalize_email(email)))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<UserRecord>> {
        let query = "SELECT * FROM type::thing('user', $id)";

        let mut res = self.db.query(query).bind(("id", user_id.clone())).await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// List every user, oldest first.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM user ORDER BY created_at ASC")
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users)
    }

    /// Check an email/password pair. `None` covers both unknown email and
    /// wrong password so callers cannot tell them apart.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>> {
        let Some(user) = self.find_by_email(email).await? else {
            debug!("login attempt for unknown email");
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            debug!(user_id = %user.uid, "login attempt with wrong password");
            Ok(None)
        }
    }

    /// Apply changes to a user. Returns `None` if the user does not exist.
    pub async fn update_user(
        &self,
        user_id: &UserId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>> {
        let email = changes.email.as_deref().map(normalize_email);

        if let Some(email) = &email
            && let Some(existing) = self.find_by_email(email).await?
            && existing.uid != *user_id
        {
            return Err(DuplicateEmail.into());
        }

        let patch = UserPatch {
            email,
            password_hash: changes.password.as_deref().map(hash_password).transpose()?,
            name: changes.name,
            role: changes.role,
        };

        let query = "UPDATE type::thing('user', $id) MERGE $patch RETURN AFTER";

        let mut res = self
            .db
            .query(query)
            .bind(("id", user_id.clone()))
            .bind(("patch", patch))
            .await?;

        let users: Vec<UserRecord> = res.take(0).map_err(unique_violation)?;
        Ok(users.into_iter().next())
    }

    /// Delete a user together with every product they own.
    ///
    /// Both deletes run in one transaction, so either the user and all of
    /// their products are gone or nothing changed. Returns `false` if the
    /// user did not exist.
    pub async fn delete_user(&self, user_id: &UserId) -> Result<bool> {
        if self.get_user(user_id).await?.is_none() {
            return Ok(false);
        }

        let query = r#"
            BEGIN TRANSACTION;
            DELETE product WHERE owner = $id;
            DELETE type::thing('user', $id);
            COMMIT TRANSACTION;
        "#;

        self.db
            .query(query)
            .bind(("id", user_id.clone()))
            .await?
            .check()?;

        info!(user_id = %user_id, "user and owned products deleted");
        Ok(true)
    }

    /// Make sure an admin account exists for `email`.
    ///
    /// An existing account is promoted; its password is left untouched.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserRecord> {
        if let Some(existing) = self.find_by_email(email).await? {
            if existing.role == Role::Admin {
                return Ok(existing);
            }

            let changes = UserChanges {
                role: Some(Role::Admin),
                ..Default::default()
            };
            return self
                .update_user(&existing.uid, changes)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User vanished while promoting to admin"));
        }

        self.create_user(email, password, name, Role::Admin).await
    }
}

/// Map a write that tripped the `user_email` index to [`DuplicateEmail`].
fn unique_violation(e: surrealdb::Error) -> anyhow::Error {
    match e {
        surrealdb::Error::Db(surrealdb::error::Db::IndexExists { ref index, .. })
            if index == EMAIL_INDEX =>
        {
            DuplicateEmail.into()
        }
        other => other.into(),
    }
}
