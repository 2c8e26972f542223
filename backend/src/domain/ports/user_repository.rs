//! Port abstraction for user account persistence adapters.

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::user::{EmailAddress, NewUser, User, UserChanges};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// No user matches the supplied identifier.
        NotFound => "User not found.",
        /// Another account already uses this email address.
        DuplicateEmail => "A user with this email already exists.",
    }
}

impl From<UserPersistenceError> for Error {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Connection { message } => Self::service_unavailable(message),
            UserPersistenceError::Query { message } => Self::internal(message),
            UserPersistenceError::NotFound => Self::not_found(error.to_string()),
            UserPersistenceError::DuplicateEmail => {
                Self::conflict(error.to_string()).with_details(json!({ "field": "email" }))
            }
        }
    }
}

/// Storage port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account, assigning its identifier.
    async fn create(&self, draft: NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Apply a self-service change set; role is structurally absent.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, UserPersistenceError>;

    /// Delete an account.
    async fn delete(&self, id: Uuid) -> Result<(), UserPersistenceError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the error-to-domain mapping.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("boom"), ErrorCode::InternalError)]
    #[case(UserPersistenceError::not_found(), ErrorCode::NotFound)]
    #[case(UserPersistenceError::duplicate_email(), ErrorCode::Conflict)]
    fn persistence_errors_map_to_domain_codes(
        #[case] error: UserPersistenceError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(Error::from(error).code(), expected);
    }
}
