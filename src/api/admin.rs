//! Admin-only user and product management. Mounted behind the admin role
//! gate, so handlers here do no role checks of their own.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::Value;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::Reply;
use crate::api::{AppState, json_body};
use crate::db::schema::{OwnerSummary, ProductView, UserProfile};
use crate::products::OwnerScope;
use crate::types::{ProductId, UserId};
use crate::validation::validate_admin_update_user;

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Reply<Vec<UserProfile>>> {
    let users = state.users.list_users().await?;

    Ok(Reply::ok(
        "All users fetched",
        users.into_iter().map(UserProfile::from).collect(),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply<UserProfile>> {
    let user = state
        .users
        .get_user(&UserId::new(id))
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Reply::ok("User fetched", user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Reply<UserProfile>> {
    let changes = validate_admin_update_user(&json_body(body)?)?;

    let user = state
        .users
        .update_user(&UserId::new(id), changes)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Reply::ok("User updated", user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let user_id = UserId::new(id);

    if !state.users.delete_user(&user_id).await? {
        return Err(user_not_found());
    }

    info!(user_id = %user_id, "user deleted by admin");
    Ok(Reply::message("User and their products deleted"))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> ApiResult<Reply<Vec<ProductView<Option<OwnerSummary>>>>> {
    let products = state.products.list_all_with_owners().await?;

    Ok(Reply::ok("All products fetched", products))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let deleted = state
        .products
        .delete(&OwnerScope::Unrestricted, &ProductId::new(id))
        .await?;

    if !deleted {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    Ok(Reply::message("Product deleted (admin)"))
}
