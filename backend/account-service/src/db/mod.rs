/// Storage contracts for account-service
///
/// Services depend on the `UserStore` and `ResetTokenStore` traits only.
/// PostgreSQL implementations live in `users` and `password_reset`; the
/// in-memory implementations in `memory` back tests and local runs.
///
/// Every implementation MUST enforce uniqueness itself (username, email
/// case-insensitively, reset token digest) and report a conflict as
/// `StoreError::UniqueViolation`. Service-level pre-checks are racy; the
/// store is the authoritative guard.
use crate::models::{NewUser, PasswordResetToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod memory;
pub mod password_reset;
pub mod users;

pub use memory::{InMemoryResetTokenStore, InMemoryUserStore};
pub use password_reset::PgResetTokenStore;
pub use users::PgUserStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Column protected by a unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    ResetToken,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0:?}")]
    UniqueViolation(UniqueField),

    #[error("storage failure: {0}")]
    Backend(String),
}

/// User record store
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Exact, case-sensitive username match
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Case-insensitive email match
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool>;

    /// Case-insensitive
    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    /// Persist a new user and return it with its assigned id
    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    /// Overwrite username, email, password hash, role and `updated_at`
    ///
    /// Returns `Ok(None)` if no user has `user.id`.
    async fn update(&self, user: &User) -> StoreResult<Option<User>>;

    /// Returns whether a row was removed
    async fn delete_by_id(&self, id: i64) -> StoreResult<bool>;

    /// All users ordered by id
    async fn find_all(&self) -> StoreResult<Vec<User>>;
}

/// Password reset token store
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn find_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<PasswordResetToken>>;

    async fn find_by_user(&self, user_id: i64) -> StoreResult<Option<PasswordResetToken>>;

    /// Persist a token, replacing any token already held by the same user
    async fn insert(&self, token: &PasswordResetToken) -> StoreResult<()>;

    /// Remove a token by digest; `true` only for the caller that removed it
    async fn delete(&self, token_hash: &str) -> StoreResult<bool>;

    /// Remove every token owned by `user_id`
    async fn delete_by_user(&self, user_id: i64) -> StoreResult<u64>;

    /// Remove tokens whose expiry is at or before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}
