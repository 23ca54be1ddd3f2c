/// Account Service Library
///
/// Provides registration, login, password management and administrative
/// user management behind a JSON REST API.
///
/// ## Modules
///
/// - `clock`: Injectable time source
/// - `config`: Service configuration
/// - `db`: Store traits with PostgreSQL and in-memory implementations
/// - `error`: Error types
/// - `http`: axum router and extractors
/// - `models`: Data models and request payloads
/// - `security`: Password hashing, JWT signing, reset token digests
/// - `services`: Business logic (credentials, admin, email delivery)
/// - `validators`: Input validation
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod security;
pub mod services;
pub mod validators;

// Re-export commonly used types
pub use error::{AccountError, Result};
