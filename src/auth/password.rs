// Password hashing and verification using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHashError)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = PasswordService::hash_password("correct horse battery staple").unwrap();
        assert!(PasswordService::verify_password("correct horse battery staple", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_fails_verification() {
        let hash = PasswordService::hash_password("secret-password").unwrap();
        assert!(!PasswordService::verify_password("other-password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = PasswordService::hash_password("same-input").unwrap();
        let second = PasswordService::hash_password("same-input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_is_rejected() {
        assert!(PasswordService::verify_password("anything", "not-a-phc-string").is_err());
    }
}
