//! Port for credential hashing.
//!
//! Handlers and the login adapter depend on this trait rather than a
//! concrete algorithm so tests can substitute a cheap double; the argon2
//! implementation lives in the outbound layer.

use crate::domain::error::Error;

/// Hash and verify passwords in PHC string format.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String, Error>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Malformed stored hashes verify as `false` rather than erroring, so a
    /// corrupted record behaves like a wrong password.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
