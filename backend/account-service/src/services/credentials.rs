/// Credential Service
///
/// Registration, login, profile and password changes, and the password
/// reset lifecycle. All collaborators are injected so the same service runs
/// against PostgreSQL in production and in-memory stores in tests.
///
/// Security features:
/// - Unknown usernames and wrong passwords are indistinguishable
/// - Unknown usernames still pay one Argon2 verification
/// - Reset tokens are stored as SHA-256 digests only
/// - Reset tokens are single use and expire after a configurable window
use super::{ensure_email_available, ensure_username_available, NewAccount};
use crate::clock::Clock;
use crate::db::{ResetTokenStore, UserStore};
use crate::error::{AccountError, Result};
use crate::models::{PasswordResetToken, User, UserView};
use crate::security::{digest_reset_token, generate_reset_token, JwtSigner, PasswordHasher};
use crate::validators::mask_email;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub token: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub expires_in: i64,
}

/// Raw reset token handed to the delivery channel
#[derive(Debug, Clone)]
pub struct ResetIssued {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
    hasher: Arc<PasswordHasher>,
    signer: Arc<JwtSigner>,
    clock: Arc<dyn Clock>,
    reset_window: Duration,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
        hasher: Arc<PasswordHasher>,
        signer: Arc<JwtSigner>,
        clock: Arc<dyn Clock>,
        reset_window: Duration,
    ) -> Self {
        Self {
            users,
            reset_tokens,
            hasher,
            signer,
            clock,
            reset_window,
        }
    }

    /// Create an account
    ///
    /// Username is checked before email; a blank or absent role becomes
    /// `ROLE_USER`.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<UserView> {
        let account = NewAccount {
            username,
            email,
            password,
            role,
        };
        let user = account
            .create(self.users.as_ref(), &self.hasher, self.clock.now())
            .await?;

        info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user.view())
    }

    /// Authentication decision only
    ///
    /// `Ok(false)` for both an unknown username and a wrong password.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool> {
        Ok(self.check_credentials(username, password).await?.is_some())
    }

    /// Verify credentials and issue an access token
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthToken> {
        let Some(user) = self.check_credentials(username, password).await? else {
            warn!("Login failed");
            return Err(AccountError::InvalidCredentials);
        };

        let token = self
            .signer
            .issue_at(user.id, &user.username, &user.role, self.clock.now())?;

        info!(user_id = user.id, "User logged in");
        Ok(AuthToken {
            token,
            username: user.username,
            email: user.email,
            role: user.role,
            expires_in: self.signer.lifetime_secs(),
        })
    }

    async fn check_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        match self.users.find_by_username(username).await? {
            Some(user) => {
                let matches = self
                    .hasher
                    .verify_blocking(password, &user.password_hash)
                    .await?;
                Ok(matches.then_some(user))
            }
            None => {
                self.hasher.verify_dummy_blocking(password).await?;
                Ok(None)
            }
        }
    }

    pub async fn get_profile(&self, username: &str) -> Result<UserView> {
        Ok(self.find_user(username).await?.view())
    }

    /// Change username and/or email
    ///
    /// Uniqueness is checked only for values that actually change, so
    /// resubmitting the current values never reports a duplicate.
    pub async fn update_profile(
        &self,
        username: &str,
        new_username: Option<&str>,
        new_email: Option<&str>,
    ) -> Result<UserView> {
        let mut user = self.find_user(username).await?;

        if let Some(new_username) = new_username {
            if new_username != user.username {
                ensure_username_available(self.users.as_ref(), new_username).await?;
                user.username = new_username.to_string();
            }
        }

        if let Some(new_email) = new_email {
            if !user.has_email(new_email) {
                ensure_email_available(self.users.as_ref(), new_email).await?;
            }
            // Keep the caller's casing even when only the case changed
            user.email = new_email.to_string();
        }

        user.updated_at = self.clock.now();
        let updated = self
            .users
            .update(&user)
            .await?
            .ok_or(AccountError::NotFound)?;

        info!(user_id = updated.id, "Profile updated");
        Ok(updated.view())
    }

    /// Change a password after re-verifying the current one
    pub async fn update_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = self.find_user(username).await?;

        let matches = self
            .hasher
            .verify_blocking(old_password, &user.password_hash)
            .await?;
        if !matches {
            return Err(AccountError::InvalidCredentials);
        }

        user.password_hash = self.hasher.hash_blocking(new_password).await?;
        user.updated_at = self.clock.now();
        self.users
            .update(&user)
            .await?
            .ok_or(AccountError::NotFound)?;

        info!(user_id = user.id, "Password updated");
        Ok(())
    }

    /// Issue a reset token for the account owning `email`
    ///
    /// Any token the user already holds is replaced.
    pub async fn request_reset(&self, email: &str) -> Result<ResetIssued> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound)?;

        let raw_token = generate_reset_token();
        let now = self.clock.now();
        let expires_at = now + self.reset_window;

        self.reset_tokens
            .insert(&PasswordResetToken {
                token_hash: digest_reset_token(&raw_token),
                user_id: user.id,
                expires_at,
                created_at: now,
            })
            .await?;

        info!(
            user_id = user.id,
            email = %mask_email(&user.email),
            %expires_at,
            "Password reset token issued"
        );

        Ok(ResetIssued {
            token: raw_token,
            email: user.email,
            expires_at,
        })
    }

    /// Redeem a reset token and set a new password
    ///
    /// The token row is deleted before the password is written; only the
    /// caller whose delete removed the row may proceed, so concurrent
    /// redemptions of one token yield exactly one success.
    pub async fn consume_reset(&self, token: &str, new_password: &str) -> Result<()> {
        let token_hash = digest_reset_token(token);
        let stored = self
            .reset_tokens
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AccountError::InvalidToken)?;

        if stored.is_expired_at(self.clock.now()) {
            self.reset_tokens.delete(&token_hash).await?;
            warn!(user_id = stored.user_id, "Expired password reset token presented");
            return Err(AccountError::TokenExpired);
        }

        if !self.reset_tokens.delete(&token_hash).await? {
            return Err(AccountError::InvalidToken);
        }

        let mut user = self
            .users
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        user.password_hash = self.hasher.hash_blocking(new_password).await?;
        user.updated_at = self.clock.now();
        self.users
            .update(&user)
            .await?
            .ok_or(AccountError::NotFound)?;

        info!(user_id = user.id, "Password reset completed");
        Ok(())
    }

    /// Delete every reset token that has expired; returns the count removed
    pub async fn purge_expired_tokens(&self) -> Result<u64> {
        let removed = self.reset_tokens.purge_expired(self.clock.now()).await?;
        if removed > 0 {
            info!(removed, "Purged expired password reset tokens");
        }
        Ok(removed)
    }

    async fn find_user(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or(AccountError::NotFound)
    }
}
