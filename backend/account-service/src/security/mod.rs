/// Security primitives for account-service
///
/// - **password**: Argon2id password hashing
/// - **crypto-core::jwt**: access token signing and validation
/// - **reset tokens**: generation and digesting of one-time reset secrets
pub use crypto_core::jwt::{Claims, JwtError, JwtSigner};

pub mod password;

pub use password::PasswordHasher;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use crypto_core::{generate_token_bytes, hash::sha256_hex};

/// Reset token entropy in bytes (256 bits)
pub const RESET_TOKEN_BYTES: usize = 32;

/// Generate a raw reset token: 32 OS-random bytes, URL-safe base64 without padding
pub fn generate_reset_token() -> String {
    URL_SAFE_NO_PAD.encode(generate_token_bytes::<RESET_TOKEN_BYTES>())
}

/// Digest stored in place of the raw reset token
pub fn digest_reset_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
