//! Argon2 implementation of the [`PasswordHasher`] port.

use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use password_hash::{PasswordHash, SaltString};

use crate::domain::ports::PasswordHasher;
use crate::domain::Error;

/// Hashes passwords with argon2id using per-password random salts,
/// producing PHC-format strings for storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, Error> {
        let mut salt_bytes = [0_u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|err| Error::internal(format!("failed to source salt entropy: {err}")))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| Error::internal(format!("failed to encode salt: {err}")))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| Error::internal(format!("failed to hash password: {err}")))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            // A malformed stored hash behaves like a wrong password.
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
