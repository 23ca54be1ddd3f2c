//! JWT issuance and validation for account services
//!
//! A `JwtSigner` is built once at startup from configuration and shared by
//! reference afterwards. It supports two key layouts:
//!
//! - **HS256**: a shared secret of at least `MIN_SECRET_LEN` bytes
//! - **RS256**: an RSA private key for signing plus the matching public key
//!
//! ## Security Design
//!
//! - Validation is pinned to the signer's own algorithm, so a token signed
//!   with a different algorithm is rejected rather than re-interpreted
//! - Issuer is always checked
//! - There is no revocation list: a token stays valid until `exp`, and
//!   replacing the key invalidates every token issued under the old one
//!
//! ## Usage
//!
//! ```rust
//! use crypto_core::jwt::JwtSigner;
//!
//! let signer = JwtSigner::from_secret(
//!     b"0123456789abcdef0123456789abcdef",
//!     "account-service",
//!     3600,
//! )
//! .unwrap();
//! let token = signer.issue(1, "alice", "ROLE_USER").unwrap();
//! let claims = signer.verify(&token).unwrap();
//! assert_eq!(claims.sub, "alice");
//! ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Shortest HS256 secret accepted (256 bits)
pub const MIN_SECRET_LEN: usize = 32;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims carried by every access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Numeric account id; stable across username changes
    pub uid: i64,
    /// Role label, e.g. `ROLE_USER` or `ROLE_ADMIN`
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Token lifetime must be positive")]
    InvalidLifetime,

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                JwtError::InvalidSignature
            }
            _ => JwtError::Malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Signer
// ============================================================================

/// Issues and verifies signed access tokens
pub struct JwtSigner {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    lifetime: Duration,
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("lifetime_secs", &self.lifetime.num_seconds())
            .finish_non_exhaustive()
    }
}

impl JwtSigner {
    /// Build an HS256 signer from a shared secret
    ///
    /// ## Errors
    ///
    /// - `WeakSecret` if the secret is shorter than `MIN_SECRET_LEN`
    /// - `InvalidLifetime` if `lifetime_secs` is not positive
    pub fn from_secret(
        secret: &[u8],
        issuer: impl Into<String>,
        lifetime_secs: i64,
    ) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::WeakSecret);
        }

        Self::build(
            Algorithm::HS256,
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
            issuer.into(),
            lifetime_secs,
        )
    }

    /// Build an RS256 signer from PEM-encoded RSA keys
    ///
    /// ## Errors
    ///
    /// Returns `InvalidKey` if either PEM fails to parse as an RSA key
    pub fn from_rsa_pem(
        private_key_pem: &str,
        public_key_pem: &str,
        issuer: impl Into<String>,
        lifetime_secs: i64,
    ) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("RSA private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("RSA public key: {e}")))?;

        Self::build(
            Algorithm::RS256,
            encoding_key,
            decoding_key,
            issuer.into(),
            lifetime_secs,
        )
    }

    fn build(
        algorithm: Algorithm,
        encoding_key: EncodingKey,
        decoding_key: DecodingKey,
        issuer: String,
        lifetime_secs: i64,
    ) -> Result<Self, JwtError> {
        if lifetime_secs <= 0 {
            return Err(JwtError::InvalidLifetime);
        }

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            issuer,
            lifetime: Duration::seconds(lifetime_secs),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Token lifetime in seconds (reported to clients as `expires_in`)
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Issue a token for account `uid` named `subject` with `role`, valid from now
    pub fn issue(&self, uid: i64, subject: &str, role: &str) -> Result<String, JwtError> {
        self.issue_at(uid, subject, role, Utc::now())
    }

    /// Issue a token as if at `issued_at`
    pub fn issue_at(
        &self,
        uid: i64,
        subject: &str,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims {
            sub: subject.to_string(),
            uid,
            role: role.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Validate signature, expiry and issuer, then return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "JWT validation failed");
                JwtError::from(e)
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
