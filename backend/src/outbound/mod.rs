//! Outbound adapters: persistence, credential hashing, and login.

pub mod login;
pub mod password;
pub mod persistence;

pub use login::PasswordLoginService;
pub use password::Argon2PasswordHasher;
pub use persistence::{DbPool, DieselBookRepository, DieselUserRepository, PoolConfig};
