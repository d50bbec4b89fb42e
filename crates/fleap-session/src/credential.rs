//! Argon2 password hashing and verification.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Result, SessionError};

/// Hash `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| SessionError::Credential(e.to_string()))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(password_hash) else {
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
  fn correct_password_verifies() {
    let hash = hash_password("234").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("234", &hash));
  }

  #[test]
  fn wrong_password_fails() {
    let hash = hash_password("234").unwrap();
    assert!(!verify_password("2345", &hash));
    assert!(!verify_password("", &hash));
  }

  #[test]
  fn salts_differ_between_hashes() {
    assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
  }

  #[test]
  fn malformed_hash_never_verifies() {
    assert!(!verify_password("234", "234"));
    assert!(!verify_password("234", ""));
  }
}
