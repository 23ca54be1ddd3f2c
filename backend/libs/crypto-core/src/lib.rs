//! Shared cryptographic primitives for account services
//!
//! - `jwt`: signed access tokens carrying subject and role claims
//! - `hash`: SHA-256 digests for storing opaque secrets
//! - `generate_token_bytes`: OS-backed randomness for one-time tokens
use rand::{rngs::OsRng, RngCore};

pub mod hash;
pub mod jwt;

/// Fill an `N`-byte buffer from the operating system RNG
pub fn generate_token_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
