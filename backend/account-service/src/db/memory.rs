/// In-memory stores with the same uniqueness guarantees as PostgreSQL
///
/// Each store serializes writes behind a single `RwLock`, so the
/// check-then-write inside `insert`/`update` is atomic and plays the role
/// of the database's unique indexes.
use super::{ResetTokenStore, StoreError, StoreResult, UniqueField, UserStore};
use crate::models::{NewUser, PasswordResetToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct UserTable {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

impl UserTable {
    /// Reject if another row (not `except_id`) holds the username or email
    fn check_unique(&self, username: &str, email: &str, except_id: Option<i64>) -> StoreResult<()> {
        let others = self
            .rows
            .values()
            .filter(|row| Some(row.id) != except_id);

        for row in others {
            if row.username == username {
                return Err(StoreError::UniqueViolation(UniqueField::Username));
            }
            if row.has_email(email) {
                return Err(StoreError::UniqueViolation(UniqueField::Email));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: RwLock<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.has_email(email)).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut table = self.table.write().await;
        table.check_unique(&user.username, &user.email, None)?;

        table.next_id += 1;
        let stored = User {
            id: table.next_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &User) -> StoreResult<Option<User>> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&user.id) {
            return Ok(None);
        }
        table.check_unique(&user.username, &user.email, Some(user.id))?;

        let Some(row) = table.rows.get_mut(&user.id) else {
            return Ok(None);
        };
        row.username = user.username.clone();
        row.email = user.email.clone();
        row.password_hash = user.password_hash.clone();
        row.role = user.role.clone();
        row.updated_at = user.updated_at;
        Ok(Some(row.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }
}

/// Reset tokens keyed by digest
#[derive(Debug, Default)]
pub struct InMemoryResetTokenStore {
    tokens: RwLock<HashMap<String, PasswordResetToken>>,
}

impl InMemoryResetTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, live or stale
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl ResetTokenStore for InMemoryResetTokenStore {
    async fn find_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<PasswordResetToken>> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> StoreResult<Option<PasswordResetToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.user_id == user_id).cloned())
    }

    async fn insert(&self, token: &PasswordResetToken) -> StoreResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token_hash) {
            return Err(StoreError::UniqueViolation(UniqueField::ResetToken));
        }
        tokens.retain(|_, existing| existing.user_id != token.user_id);
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn delete(&self, token_hash: &str) -> StoreResult<bool> {
        Ok(self.tokens.write().await.remove(token_hash).is_some())
    }

    async fn delete_by_user(&self, user_id: i64) -> StoreResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - tokens.len()) as u64)
    }
}
