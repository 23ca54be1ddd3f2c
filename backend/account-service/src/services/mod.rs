/// Service layer for account-service
///
/// - Credential service (registration, login, profile, password reset)
/// - Admin service (user CRUD keyed by id)
/// - Email service (password reset delivery over SMTP)
/// - Bootstrap (initial administrator)
pub mod admin;
pub mod bootstrap;
pub mod credentials;
pub mod email;

pub use admin::AdminService;
pub use bootstrap::seed_admin;
pub use credentials::{AuthToken, CredentialService, ResetIssued};
pub use email::{EmailService, ResetDelivery};

use crate::db::UserStore;
use crate::error::{AccountError, Result};
use crate::models::{user::resolve_role, NewUser, User};
use crate::security::PasswordHasher;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub(crate) async fn ensure_username_available(users: &dyn UserStore, username: &str) -> Result<()> {
    if users.exists_by_username(username).await? {
        return Err(AccountError::DuplicateUsername);
    }
    Ok(())
}

pub(crate) async fn ensure_email_available(users: &dyn UserStore, email: &str) -> Result<()> {
    if users.exists_by_email(email).await? {
        return Err(AccountError::DuplicateEmail);
    }
    Ok(())
}

/// Account creation shared by self-registration, admin creation and seeding
pub(crate) struct NewAccount<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Option<&'a str>,
}

impl NewAccount<'_> {
    /// Pre-check uniqueness, hash, insert
    ///
    /// The pre-checks give the username-first error order; the store's
    /// unique constraints catch the race between check and insert.
    pub async fn create(
        &self,
        users: &dyn UserStore,
        hasher: &Arc<PasswordHasher>,
        now: DateTime<Utc>,
    ) -> Result<User> {
        ensure_username_available(users, self.username).await?;
        ensure_email_available(users, self.email).await?;

        let password_hash = hasher.hash_blocking(self.password).await?;

        let user = users
            .insert(NewUser {
                username: self.username.to_string(),
                email: self.email.to_string(),
                password_hash,
                role: resolve_role(self.role),
                created_at: now,
            })
            .await?;

        Ok(user)
    }
}
