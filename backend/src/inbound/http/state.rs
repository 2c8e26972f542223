//! Shared application state handed to HTTP handlers.

use std::sync::Arc;

use crate::domain::ports::{BookRepository, LoginService, PasswordHasher, UserRepository};

/// Ports the HTTP layer drives.
///
/// Handlers only see trait objects, so tests swap in in-memory adapters and
/// production wires the Diesel-backed ones.
#[derive(Clone)]
pub struct HttpState {
    /// Book and page storage.
    pub books: Arc<dyn BookRepository>,
    /// User account storage.
    pub users: Arc<dyn UserRepository>,
    /// Credential verification.
    pub login: Arc<dyn LoginService>,
    /// Password hashing for registration and password changes.
    pub hasher: Arc<dyn PasswordHasher>,
}

impl HttpState {
    /// Bundle the ports the handlers need.
    pub fn new(
        books: Arc<dyn BookRepository>,
        users: Arc<dyn UserRepository>,
        login: Arc<dyn LoginService>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            books,
            users,
            login,
            hasher,
        }
    }
}
