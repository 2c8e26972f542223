//! Authentication primitives: login credentials and the authenticated actor.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::user::{EmailAddress, Role, UserValidationError};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or malformed.
    InvalidEmail(UserValidationError),
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(inner) => write!(f, "{inner}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated login credentials used by the authentication port.
///
/// ## Invariants
/// - `email` is normalised through [`EmailAddress`].
/// - `password` is non-empty but otherwise kept verbatim to avoid surprising
///   credential comparisons; the buffer is zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(email).map_err(CredentialsValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email for account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password exactly as supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Authenticated principal derived from a verified credential token.
///
/// The role travels inside the token as a claim, so building an actor never
/// requires a repository round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Account identifier (the token's `sub` claim).
    pub id: Uuid,
    /// Access role (the token's `role` claim).
    pub role: Role,
}
