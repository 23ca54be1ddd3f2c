/// Admin user management endpoints (`ROLE_ADMIN` only)
use super::extract::{AdminUser, ValidatedJson};
use super::AppState;
use crate::error::Result;
use crate::models::user::{CreateUserRequest, RoleChangeRequest, UpdateUserRequest};
use crate::models::UserView;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserView>>> {
    Ok(Json(state.admin.list_users().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>)> {
    let user = state
        .admin
        .create_user(&req.username, &req.email, &req.password, req.role.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<UserView>> {
    Ok(Json(state.admin.get_user(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserView>> {
    let user = state
        .admin
        .update_user(
            id,
            req.username.as_deref(),
            req.email.as_deref(),
            req.role.as_deref(),
        )
        .await?;
    Ok(Json(user))
}

pub async fn change_role(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<RoleChangeRequest>,
) -> Result<Json<UserView>> {
    Ok(Json(state.admin.change_role(id, &req.role).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.admin.delete_user(id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
