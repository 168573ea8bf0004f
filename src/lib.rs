// Core modules
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod products;
pub mod types;
pub mod validation;

// Re-export key types and functions
pub use api::{AppState, create_router};
pub use auth::{AuthConfig, UserContext};
pub use config::{AdminSeed, ServerConfig};
pub use db::{DatabaseConfig, create_connection, ensure_schema};
pub use types::{ProductId, UserId};

use anyhow::Result;
use axum::Router;
use tracing::info;

/// Connect to the database, prepare the schema and build the router.
///
/// If the config names a bootstrap admin, that account is created (or
/// promoted) before the router is returned.
pub async fn create_app(config: &ServerConfig) -> Result<Router> {
    config.validate()?;

    let db = create_connection(config.database.clone()).await?;
    ensure_schema(&db).await?;

    let state = AppState::new(db, &config.auth);

    if let Some(seed) = &config.bootstrap_admin {
        let admin = state
            .users
            .ensure_admin(&seed.email, &seed.password, seed.name.as_deref())
            .await?;
        info!(user_id = %admin.uid, "bootstrap admin ready");
    }

    Ok(create_router(state))
}
