//! Domain ports: traits the inbound adapters drive and the outbound
//! adapters implement.

mod book_repository;
mod login_service;
pub(crate) mod macros;
mod password_hasher;
mod user_repository;

pub use book_repository::{BookPersistenceError, BookRepository};
pub use login_service::{LoginService, INVALID_CREDENTIALS};
pub use password_hasher::PasswordHasher;
pub use user_repository::{UserPersistenceError, UserRepository};
