//! Registration, login and the caller's own account.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::Reply;
use crate::api::{AppState, json_body};
use crate::auth::UserContext;
use crate::db::schema::{Role, UserProfile, UserRecord};
use crate::validation::{validate_login, validate_register, validate_self_update};

/// Data returned by register and login.
#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

fn open_session(state: &AppState, user: UserRecord) -> ApiResult<Session> {
    let token = state
        .tokens
        .issue(&user.uid)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;

    Ok(Session {
        token,
        user: user.into(),
    })
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Reply<Session>> {
    let input = validate_register(&json_body(body)?)?;

    let user = state
        .users
        .create_user(&input.email, &input.password, input.name.as_deref(), Role::User)
        .await?;

    info!(user_id = %user.uid, "user registered");
    Ok(Reply::created("User registered", open_session(&state, user)?))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Reply<Session>> {
    let input = validate_login(&json_body(body)?)?;

    let user = state
        .users
        .verify_credentials(&input.email, &input.password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    Ok(Reply::ok("Login successful", open_session(&state, user)?))
}

pub async fn me(Extension(ctx): Extension<UserContext>) -> Reply<UserProfile> {
    Reply::ok("User fetched", ctx.into_profile())
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Reply<UserProfile>> {
    let changes = validate_self_update(&json_body(body)?)?;

    let user = state
        .users
        .update_user(ctx.user_id(), changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Reply::ok("Profile updated", user.into()))
}
