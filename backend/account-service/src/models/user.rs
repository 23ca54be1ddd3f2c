use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Role assigned when registration does not name one
pub const DEFAULT_ROLE: &str = "ROLE_USER";

/// Role required by the admin API
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Resolve the role to store: blank or absent means `DEFAULT_ROLE`
pub fn resolve_role(role: Option<&str>) -> String {
    match role.map(str::trim) {
        Some(role) if !role.is_empty() => role.to_string(),
        _ => DEFAULT_ROLE.to_string(),
    }
}

/// User model - core identity entity
///
/// Deliberately not `Serialize`: the password hash must never reach a
/// response body. Use [`UserView`] at the boundary.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// Whether `email` refers to this user's address (case-insensitive)
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

/// Insert payload; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// User projection safe to return to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView::from(&user)
    }
}

/// User registration request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "crate::validators::validate_username_shape")
    )]
    pub username: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 64, message = "Role must be at most 64 characters"))]
    pub role: Option<String>,
}

/// User login request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Self-service profile update; absent fields are left unchanged
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "crate::validators::validate_username_shape")
    )]
    pub username: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
}

/// Password change request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub new_password: String,
}

/// Password reset initiation request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

/// Password reset completion request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, max = 256, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub new_password: String,
}

/// Admin user creation request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "crate::validators::validate_username_shape")
    )]
    pub username: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 64, message = "Role must be at most 64 characters"))]
    pub role: Option<String>,
}

/// Admin user update; absent fields are left unchanged
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "crate::validators::validate_username_shape")
    )]
    pub username: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Role must be 1-64 characters"))]
    pub role: Option<String>,
}

/// Admin role change request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RoleChangeRequest {
    #[validate(length(min = 1, max = 64, message = "Role must be 1-64 characters"))]
    pub role: String,
}
