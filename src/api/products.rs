//! Product routes for any signed-in user.
//!
//! Single-product routes resolve through [`OwnerScope::for_requester`], so a
//! regular user addressing someone else's product gets the same 404 as for a
//! product that does not exist.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::Reply;
use crate::api::{AppState, json_body};
use crate::auth::UserContext;
use crate::db::schema::ProductView;
use crate::products::OwnerScope;
use crate::types::ProductId;
use crate::validation::{validate_create_product, validate_update_product};

fn product_not_found() -> ApiError {
    ApiError::NotFound("Product not found".to_string())
}

pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> ApiResult<Reply<Vec<ProductView>>> {
    let products = state.products.list_owned(ctx.user_id()).await?;

    Ok(Reply::ok(
        "Products fetched",
        products.into_iter().map(ProductView::from).collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Reply<ProductView>> {
    let product = validate_create_product(&json_body(body)?)?;

    let created = state.products.create(ctx.user_id(), product).await?;

    Ok(Reply::created("Product created", created.into()))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Reply<ProductView>> {
    let scope = OwnerScope::for_requester(&ctx);

    let product = state
        .products
        .find(&scope, &ProductId::new(id))
        .await?
        .ok_or_else(product_not_found)?;

    Ok(Reply::ok("Product fetched", product.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Reply<ProductView>> {
    let patch = validate_update_product(&json_body(body)?)?;
    let scope = OwnerScope::for_requester(&ctx);

    let product = state
        .products
        .update(&scope, &ProductId::new(id), patch)
        .await?
        .ok_or_else(product_not_found)?;

    Ok(Reply::ok("Product updated", product.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(id): Path<String>,
) -> ApiResult<Reply<()>> {
    let scope = OwnerScope::for_requester(&ctx);

    if !state.products.delete(&scope, &ProductId::new(id)).await? {
        return Err(product_not_found());
    }

    Ok(Reply::message("Product deleted"))
}
