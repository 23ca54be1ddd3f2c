/// Data models for accounts and password resets
pub mod password_reset;
pub mod user;

pub use password_reset::PasswordResetToken;
pub use user::{NewUser, User, UserView, ADMIN_ROLE, DEFAULT_ROLE};
