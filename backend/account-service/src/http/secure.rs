/// Role probes
use super::extract::{AdminUser, AuthUser};
use axum::Json;
use serde_json::{json, Value};

pub async fn user_hello(caller: AuthUser) -> Json<Value> {
    Json(json!({
        "message": format!("Hello, {}", caller.username),
        "role": caller.role,
    }))
}

pub async fn admin_hello(AdminUser(caller): AdminUser) -> Json<Value> {
    Json(json!({
        "message": format!("Hello admin, {}", caller.username),
        "role": caller.role,
    }))
}
