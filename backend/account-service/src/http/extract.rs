//! Request extractors that enforce authentication and input validation at
//! the type level

use super::AppState;
use crate::error::AccountError;
use crate::models::ADMIN_ROLE;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

/// Caller authenticated by a bearer access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// Allow access to the account with id `owner_id`: own account or admin
    ///
    /// Compares account ids; the token's username may be stale after a rename.
    pub fn ensure_owns(&self, owner_id: i64) -> Result<(), AccountError> {
        if self.user_id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(AccountError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AccountError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AccountError::Unauthorized)?;

        let claims = state.signer.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AccountError::from(e)
        })?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            role: claims.role,
        })
    }
}

/// Caller holding `ROLE_ADMIN`
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AccountError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AccountError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

/// JSON body that has passed `validator` checks
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AccountError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AccountError::invalid_field("body", rejection.body_text()))?;

        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
