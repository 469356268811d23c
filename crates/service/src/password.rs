//! Password storage policy applied by [`crate::user_service::UserService`].

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use configs::PasswordHashing;
use rand::rngs::OsRng;

use crate::errors::ServiceError;

#[derive(Clone, Copy, Debug, Default)]
pub struct PasswordPolicy {
    mode: PasswordHashing,
}

impl PasswordPolicy {
    pub fn new(mode: PasswordHashing) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PasswordHashing {
        self.mode
    }

    /// Turn a raw password into the value that is written to the `password` column.
    pub fn protect(&self, raw: String) -> Result<String, ServiceError> {
        match self.mode {
            PasswordHashing::Plaintext => Ok(raw),
            PasswordHashing::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(raw.as_bytes(), &salt)
                    .map_err(|e| ServiceError::Hash(e.to_string()))?
                    .to_string();
                Ok(hash)
            }
        }
    }

    /// Check a raw password against a stored column value.
    pub fn verify(&self, raw: &str, stored: &str) -> Result<bool, ServiceError> {
        match self.mode {
            PasswordHashing::Plaintext => Ok(raw == stored),
            PasswordHashing::Argon2 => {
                let parsed = PasswordHash::new(stored).map_err(|e| ServiceError::Hash(e.to_string()))?;
                Ok(Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_hashes_and_verifies() {
        let policy = PasswordPolicy::new(PasswordHashing::Argon2);
        let stored = policy.protect("p".into()).unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(policy.verify("p", &stored).unwrap());
        assert!(!policy.verify("q", &stored).unwrap());
    }

    #[test]
    fn salts_differ_between_calls() {
        let policy = PasswordPolicy::default();
        assert_ne!(policy.protect("same".into()).unwrap(), policy.protect("same".into()).unwrap());
    }

    #[test]
    fn plaintext_is_stored_verbatim() {
        let policy = PasswordPolicy::new(PasswordHashing::Plaintext);
        assert_eq!(policy.protect("p".into()).unwrap(), "p");
        assert!(policy.verify("p", "p").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let policy = PasswordPolicy::new(PasswordHashing::Argon2);
        assert!(matches!(policy.verify("p", "not-a-phc-string"), Err(ServiceError::Hash(_))));
    }
}
