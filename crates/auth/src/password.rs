//! Password hashing and verification (scrypt, PHC string format).

use scrypt::{
    Scrypt,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use rolodex_core::{DomainError, DomainResult};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
#[error("password hashing failed")]
pub struct HashError;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|_| HashError)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash string.
///
/// A malformed stored hash verifies as `false` rather than erroring: from the
/// caller's point of view the credential simply does not match.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed).is_ok()
}

/// Reject passwords below the minimum length before any hashing happens.
pub fn validate_password(plain: &str) -> DomainResult<()> {
    if plain.len() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
