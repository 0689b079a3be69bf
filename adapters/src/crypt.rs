//! Credential hashing adapter.
//!
//! Passwords are stored as Argon2id PHC strings; comparison parses the stored
//! hash so parameters can change without invalidating existing records.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::{AdapterError, Result};

pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// `Ok(false)` for a wrong password; `Err` only for a malformed stored hash.
    fn compare(&self, plaintext: &str, hash: &str) -> Result<bool>;
}

#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AdapterError::Hash(err.to_string()))
    }

    fn compare(&self, plaintext: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|err| AdapterError::Hash(err.to_string()))?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(AdapterError::Hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_compare() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("Str0ng!pass").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.compare("Str0ng!pass", &hash).unwrap());
        assert!(!hasher.compare("wrong", &hash).unwrap());
        assert!(hasher.compare("Str0ng!pass", "not-a-hash").is_err());
    }
}
