/// Self-service profile endpoints
///
/// The path username is resolved to an account and its id must match the
/// bearer token's account id unless the caller is an admin.
use super::extract::{AuthUser, ValidatedJson};
use super::AppState;
use crate::error::{AccountError, Result};
use crate::models::user::{UpdatePasswordRequest, UpdateProfileRequest};
use crate::models::UserView;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// Resolve `username` and check the caller may act on it
///
/// Non-admins get `Forbidden` for unknown usernames too.
async fn authorize(state: &AppState, caller: &AuthUser, username: &str) -> Result<()> {
    if caller.is_admin() {
        return Ok(());
    }
    match state.credentials.get_profile(username).await {
        Ok(owner) => caller.ensure_owns(owner.id),
        Err(AccountError::NotFound) => Err(AccountError::Forbidden),
        Err(e) => Err(e),
    }
}

pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserView>> {
    authorize(&state, &caller, &username).await?;
    Ok(Json(state.credentials.get_profile(&username).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(username): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserView>> {
    authorize(&state, &caller, &username).await?;
    let user = state
        .credentials
        .update_profile(&username, req.username.as_deref(), req.email.as_deref())
        .await?;
    Ok(Json(user))
}

pub async fn update_password(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(username): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> Result<Json<Value>> {
    authorize(&state, &caller, &username).await?;
    state
        .credentials
        .update_password(&username, &req.old_password, &req.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}
