//! Diesel-backed implementation of the [`UserRepository`] port.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, NewUser, User, UserChanges};

use super::error_mapping::is_unique_violation;
use super::models::{NewUserRow, UserChangesetRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Stores user accounts in PostgreSQL.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
        UserPersistenceError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| UserPersistenceError::connection(err.to_string()))
    }
}

fn map_write_error(error: diesel::result::Error) -> UserPersistenceError {
    if is_unique_violation(&error) {
        UserPersistenceError::duplicate_email()
    } else {
        UserPersistenceError::query(error.to_string())
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, draft: NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.conn().await?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            email: draft.email.as_ref(),
            name: draft.name.as_ref(),
            role: draft.role.as_str(),
            is_active: true,
            is_staff: draft.is_staff,
            is_superuser: draft.is_superuser,
            password_hash: &draft.password_hash,
        };
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_write_error)?;
        User::try_from(inserted).map_err(UserPersistenceError::query)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.conn().await?;
        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        row.map(User::try_from)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.conn().await?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        row.map(User::try_from)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, UserPersistenceError> {
        if changes.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(UserPersistenceError::not_found);
        }
        let mut conn = self.conn().await?;
        let changeset = UserChangesetRow {
            email: changes.email.as_ref().map(AsRef::as_ref),
            name: changes.name.as_ref().map(AsRef::as_ref),
            password_hash: changes.password_hash.as_deref(),
        };
        let updated: Option<UserRow> = diesel::update(users::table.find(id))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_write_error)?;
        let row = updated.ok_or_else(UserPersistenceError::not_found)?;
        User::try_from(row).map_err(UserPersistenceError::query)
    }

    async fn delete(&self, id: Uuid) -> Result<(), UserPersistenceError> {
        let mut conn = self.conn().await?;
        let affected = diesel::delete(users::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        if affected == 0 {
            return Err(UserPersistenceError::not_found());
        }
        Ok(())
    }
}
