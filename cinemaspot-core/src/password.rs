use crate::{CoreError, CoreResult};

/// bcrypt work factor for stored passwords.
pub const HASH_COST: u32 = 10;

pub fn hash_password(plain: &str) -> CoreResult<String> {
    hash_password_with_cost(plain, HASH_COST)
}

pub fn hash_password_with_cost(plain: &str, cost: u32) -> CoreResult<String> {
    bcrypt::hash(plain, cost).map_err(|e| CoreError::Internal(format!("password hashing failed: {}", e)))
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match bcrypt::verify(plain, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}
