//! Driving port for credential authentication.
//!
//! Inbound adapters call this port to turn credentials into an
//! [`Actor`] without knowing the backing infrastructure, which keeps
//! handler tests deterministic via test doubles.

use async_trait::async_trait;

use crate::domain::auth::{Actor, Credentials};
use crate::domain::error::Error;

/// Message returned for any credential failure.
///
/// Unknown email, wrong password, and deactivated accounts are deliberately
/// indistinguishable to the caller.
pub const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated actor.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Actor, Error>;
}
