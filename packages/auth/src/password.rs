//! bcrypt password hashing.

use crate::AuthError;

/// Hashes `password` with the given bcrypt work factor.
///
/// # Errors
///
/// Returns [`AuthError::Hash`] if the cost is out of range.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Checks `password` against a stored bcrypt hash.
///
/// # Errors
///
/// Returns [`AuthError::Hash`] if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}
