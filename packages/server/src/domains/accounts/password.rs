//! Argon2id password hashing.

use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash a plaintext password into a PHC-format Argon2id string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("failed to hash password: {e}"))
}

/// Verify a plaintext password against a stored hash.
///
/// A malformed stored hash counts as a failed verification rather than an
/// error; login just fails.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2hunter2", &hash));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
