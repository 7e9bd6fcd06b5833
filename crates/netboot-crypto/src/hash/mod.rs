//! Hash utilities
//!
//! Salted bcrypt hashes in the modular crypt format (`$2b$12$...`), the
//! format stored in the local credential store.

use thiserror::Error;

/// Cost used by the hash utility
pub const DEFAULT_COST: u32 = 12;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("invalid cost {0}: must be between 4 and 31")]
    InvalidCost(u32),

    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    #[error("hashing failed: {0}")]
    Hashing(String),
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, HashError> {
    if !(4..=31).contains(&cost) {
        return Err(HashError::InvalidCost(cost));
    }

    bcrypt::hash(password, cost).map_err(|e| HashError::Hashing(e.to_string()))
}

/// Check `password` against a stored hash.
///
/// `Ok(false)` is a mismatch. Any error means the stored hash is unusable,
/// including hashes that parse but carry an out-of-range cost or salt.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, HashError> {
    bcrypt::verify(password, stored_hash).map_err(|e| HashError::MalformedHash(e.to_string()))
}
