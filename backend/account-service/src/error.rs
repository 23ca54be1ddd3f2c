use crate::db::{StoreError, UniqueField};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crypto_core::jwt::JwtError;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AccountError>;

/// Field name -> first failure message, as returned to the client
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("Invalid password reset token")]
    InvalidToken,

    #[error("Password reset token expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient role")]
    Forbidden,

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        AccountError::Validation(errors)
    }

    /// HTTP status for the REST boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::DuplicateUsername | AccountError::DuplicateEmail => StatusCode::CONFLICT,
            AccountError::NotFound => StatusCode::NOT_FOUND,
            AccountError::InvalidToken
            | AccountError::TokenExpired
            | AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::InvalidCredentials | AccountError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AccountError::Forbidden => StatusCode::FORBIDDEN,
            AccountError::Database(_) | AccountError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AccountError::Validation(errors) => json!({ "errors": errors }),
            // Don't leak internal details to clients
            AccountError::Database(detail) | AccountError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed with internal error");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

// Conversions from external error types
impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueField::Username) => AccountError::DuplicateUsername,
            StoreError::UniqueViolation(UniqueField::Email) => AccountError::DuplicateEmail,
            StoreError::UniqueViolation(UniqueField::ResetToken) => {
                AccountError::Internal("reset token collision".to_string())
            }
            StoreError::Backend(msg) => {
                tracing::error!("Store error: {}", msg);
                AccountError::Database(msg)
            }
        }
    }
}

impl From<JwtError> for AccountError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired | JwtError::InvalidSignature | JwtError::Malformed(_) => {
                AccountError::Unauthorized
            }
            other => {
                tracing::error!("JWT error: {}", other);
                AccountError::Internal(other.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AccountError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors = err
            .field_errors()
            .into_iter()
            .map(|(field, failures)| {
                let message = failures
                    .iter()
                    .find_map(|failure| failure.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
            .collect();

        AccountError::Validation(errors)
    }
}

impl From<tokio::task::JoinError> for AccountError {
    fn from(err: tokio::task::JoinError) -> Self {
        AccountError::Internal(format!("blocking task failed: {}", err))
    }
}
