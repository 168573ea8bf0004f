// REST API for the catalog

pub mod admin;
pub mod auth;
pub mod error;
pub mod products;
pub mod response;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{
    AuthConfig, AuthExtractor, RoleGate, TokenService, UserStore, auth_layer, role_gate,
};
use crate::db::Db;
use crate::products::ProductStore;

pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, Reply};

/// Handles shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub products: Arc<ProductStore>,
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthExtractor>,
}

impl AppState {
    pub fn new(db: Db, auth_config: &AuthConfig) -> Self {
        let users = Arc::new(UserStore::new(db.clone()));
        let tokens = Arc::new(TokenService::new(auth_config));
        let auth = Arc::new(AuthExtractor::new(tokens.clone(), users.clone()));

        Self {
            users,
            products: Arc::new(ProductStore::new(db)),
            tokens,
            auth,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let authenticated = from_fn_with_state(state.auth.clone(), auth_layer);

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let account = Router::new()
        .route("/auth/me", get(auth::me).patch(auth::update_me))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get)
                .patch(products::update)
                .delete(products::delete),
        )
        .route_layer(authenticated.clone());

    // Layers run outermost-last: authenticate, then check the role.
    let admin = Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/products", get(admin::list_products))
        .route("/products/{id}", delete(admin::delete_product))
        .route_layer(from_fn_with_state(RoleGate::admin_only(), role_gate))
        .route_layer(authenticated);

    let v1 = Router::new()
        .merge(public)
        .merge(account)
        .nest("/admin", admin);

    Router::new()
        .route("/", get(health_check))
        .nest("/api/v1", v1)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Unwrap a JSON body, turning syntax and content-type failures into
/// validation errors.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}
