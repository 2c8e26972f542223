//! Credential-verifying implementation of the [`LoginService`] port.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{LoginService, PasswordHasher, UserRepository, INVALID_CREDENTIALS};
use crate::domain::{Actor, Credentials, Error};

/// Authenticates credentials against stored accounts.
///
/// Lookup failures, wrong passwords, and inactive accounts all collapse into
/// the same rejection so callers cannot probe which accounts exist.
pub struct PasswordLoginService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl PasswordLoginService {
    /// Wire the service to an account store and a hasher.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl LoginService for PasswordLoginService {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Actor, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Error::from)?;
        let Some(user) = user else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !user.is_active() {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        if !self
            .hasher
            .verify(credentials.password(), user.password_hash())
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(Actor {
            id: user.id(),
            role: user.role(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::UserPersistenceError;
    use crate::domain::{EmailAddress, ErrorCode, NewUser, Role, User, UserChanges, UserName};
    use uuid::Uuid;

    struct StubUsers {
        user: Option<User>,
    }

    #[async_trait]
    impl UserRepository for StubUsers {
        async fn create(&self, _draft: NewUser) -> Result<User, UserPersistenceError> {
            Err(UserPersistenceError::query("not exercised"))
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, UserPersistenceError> {
            Ok(self.user.clone())
        }

        async fn find_by_email(
            &self,
            _email: &EmailAddress,
        ) -> Result<Option<User>, UserPersistenceError> {
            Ok(self.user.clone())
        }

        async fn update(
            &self,
            _id: Uuid,
            _changes: UserChanges,
        ) -> Result<User, UserPersistenceError> {
            Err(UserPersistenceError::query("not exercised"))
        }

        async fn delete(&self, _id: Uuid) -> Result<(), UserPersistenceError> {
            Err(UserPersistenceError::query("not exercised"))
        }
    }

    struct StubHasher {
        accept: bool,
    }

    impl PasswordHasher for StubHasher {
        fn hash(&self, password: &str) -> Result<String, Error> {
            Ok(format!("hashed:{password}"))
        }

        fn verify(&self, _password: &str, _hash: &str) -> bool {
            self.accept
        }
    }

    fn account(active: bool) -> User {
        let draft = NewUser::editor(
            EmailAddress::new("test@example.com").expect("email"),
            UserName::new("Test User").expect("name"),
            "hashed:testpass".into(),
        );
        User::from_parts(Uuid::new_v4(), draft).with_active(active)
    }

    fn service(user: Option<User>, accept: bool) -> PasswordLoginService {
        PasswordLoginService::new(
            Arc::new(StubUsers { user }),
            Arc::new(StubHasher { accept }),
        )
    }

    fn credentials() -> Credentials {
        Credentials::try_from_parts("test@example.com", "testpass").expect("credentials")
    }

    #[actix_rt::test]
    async fn valid_credentials_yield_an_actor() {
        let user = account(true);
        let expected = user.id();
        let actor = service(Some(user), true)
            .authenticate(&credentials())
            .await
            .expect("authenticated");
        assert_eq!(actor.id, expected);
        assert_eq!(actor.role, Role::Editor);
    }

    #[actix_rt::test]
    async fn unknown_account_is_rejected() {
        let err = service(None, true)
            .authenticate(&credentials())
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[actix_rt::test]
    async fn inactive_account_is_rejected() {
        let err = service(Some(account(false)), true)
            .authenticate(&credentials())
            .await
            .expect_err("rejected");
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[actix_rt::test]
    async fn wrong_password_is_rejected() {
        let err = service(Some(account(true)), false)
            .authenticate(&credentials())
            .await
            .expect_err("rejected");
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }
}
