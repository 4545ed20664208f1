//! Password hashing utilities

use crate::shared::InfraError;

/// Lowest cost bcrypt accepts
pub const MIN_COST: u32 = 4;

/// Hash a password using bcrypt
pub fn hash_password(password: &str, cost: u32) -> Result<String, InfraError> {
    Ok(bcrypt::hash(password, cost.max(MIN_COST))?)
}

/// Verify a password against a hash. A malformed stored hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
