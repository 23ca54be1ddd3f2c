/// Administrative user management keyed by numeric id
use super::{ensure_email_available, ensure_username_available, NewAccount};
use crate::clock::Clock;
use crate::db::{ResetTokenStore, UserStore};
use crate::error::{AccountError, Result};
use crate::models::{user::resolve_role, User, UserView};
use crate::security::PasswordHasher;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
    hasher: Arc<PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UserStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
        hasher: Arc<PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            reset_tokens,
            hasher,
            clock,
        }
    }

    pub async fn create_user(
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

        info!(user_id = user.id, role = %user.role, "User created by admin");
        Ok(user.view())
    }

    pub async fn list_users(&self) -> Result<Vec<UserView>> {
        let users = self.users.find_all().await?;
        Ok(users.iter().map(UserView::from).collect())
    }

    pub async fn get_user(&self, id: i64) -> Result<UserView> {
        Ok(self.find_user(id).await?.view())
    }

    /// Overwrite any supplied field; no password needed
    pub async fn update_user(
        &self,
        id: i64,
        username: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<UserView> {
        let mut user = self.find_user(id).await?;

        if let Some(username) = username {
            if username != user.username {
                ensure_username_available(self.users.as_ref(), username).await?;
                user.username = username.to_string();
            }
        }

        if let Some(email) = email {
            if !user.has_email(email) {
                ensure_email_available(self.users.as_ref(), email).await?;
            }
            user.email = email.to_string();
        }

        if let Some(role) = role {
            user.role = resolve_role(Some(role));
        }

        let updated = self.save(user).await?;
        info!(user_id = id, "User updated by admin");
        Ok(updated.view())
    }

    pub async fn change_role(&self, id: i64, role: &str) -> Result<UserView> {
        let mut user = self.find_user(id).await?;
        user.role = resolve_role(Some(role));

        let updated = self.save(user).await?;
        info!(user_id = id, role = %updated.role, "User role changed");
        Ok(updated.view())
    }

    /// Remove a user and any reset token it holds
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.find_user(id).await?;

        self.reset_tokens.delete_by_user(id).await?;
        if !self.users.delete_by_id(id).await? {
            return Err(AccountError::NotFound);
        }

        info!(user_id = id, "User deleted");
        Ok(())
    }

    async fn find_user(&self, id: i64) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    async fn save(&self, mut user: User) -> Result<User> {
        user.updated_at = self.clock.now();
        self.users
            .update(&user)
            .await?
            .ok_or(AccountError::NotFound)
    }
}
