/// Password hashing and verification using Argon2id
use crate::config::PasswordSettings;
use crate::error::{AccountError, Result};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;

/// Plaintext hashed at construction to give unknown-user logins a real digest to check
const DUMMY_PLAINTEXT: &str = "timing-equalizer-not-a-password";

/// Argon2id hasher with configurable cost
///
/// ## Security
///
/// - Algorithm: Argon2id, version 0x13
/// - Salt: random 16-byte salt from the OS RNG per hash
/// - Output: PHC string, so parameters travel with the digest and older
///   digests keep verifying after a cost change
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Same cost as real digests; built before the first login
    dummy_digest: String,
}

impl PasswordHasher {
    pub fn new(settings: &PasswordSettings) -> Result<Self> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| AccountError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_digest = hash_with(&argon2, DUMMY_PLAINTEXT)?;

        Ok(Self {
            argon2,
            dummy_digest,
        })
    }

    /// Hash a password
    ///
    /// ## Returns
    ///
    /// PHC-formatted hash string safe for database storage
    pub fn hash(&self, password: &str) -> Result<String> {
        hash_with(&self.argon2, password)
    }

    /// Verify a password against its hash
    ///
    /// Uses the parameters embedded in the digest and a constant-time
    /// comparison. A digest that does not parse is an internal error rather
    /// than a mismatch.
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| AccountError::Internal(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AccountError::Internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }

    /// Spend one verification's worth of work and report a mismatch
    ///
    /// Called when the username is unknown, so that response time does not
    /// reveal whether an account exists.
    pub fn verify_dummy(&self, password: &str) -> Result<bool> {
        self.verify(password, &self.dummy_digest)?;
        Ok(false)
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn hash_blocking(self: &Arc<Self>, password: &str) -> Result<String> {
        let hasher = Arc::clone(self);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn verify_blocking(self: &Arc<Self>, password: &str, password_hash: &str) -> Result<bool> {
        let hasher = Arc::clone(self);
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash)).await?
    }

    /// [`verify_dummy`](Self::verify_dummy) on the blocking pool
    pub async fn verify_dummy_blocking(self: &Arc<Self>, password: &str) -> Result<bool> {
        let hasher = Arc::clone(self);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password)).await?
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}
