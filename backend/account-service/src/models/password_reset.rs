use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Stored password reset capability
///
/// Only the SHA-256 digest of the token is kept; the raw value leaves the
/// service once, through the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PasswordResetToken {
    pub token_hash: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// A token is dead from its expiry instant onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
