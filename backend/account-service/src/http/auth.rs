/// Public authentication endpoints
use super::extract::ValidatedJson;
use super::AppState;
use crate::error::{AccountError, Result};
use crate::models::user::{
    resolve_role, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::models::DEFAULT_ROLE;
use crate::services::AuthToken;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if !state.allow_self_assigned_role && resolve_role(req.role.as_deref()) != DEFAULT_ROLE {
        warn!("Self-assigned role rejected on registration");
        return Err(AccountError::Forbidden);
    }

    let user = state
        .credentials
        .register(&req.username, &req.email, &req.password, req.role.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "role": user.role,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthToken>> {
    let token = state
        .credentials
        .authenticate(&req.username, &req.password)
        .await?;
    Ok(Json(token))
}

/// Issue a reset token and send it to the account's email address
///
/// The token itself never appears in the response.
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<Value>> {
    let issued = state.credentials.request_reset(&req.email).await?;
    state
        .delivery
        .deliver(&issued.email, &issued.token, issued.expires_at)
        .await?;

    Ok(Json(json!({
        "message": "Password reset instructions have been sent to your email",
    })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<Value>> {
    state
        .credentials
        .consume_reset(&req.token, &req.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password has been reset successfully" })))
}
