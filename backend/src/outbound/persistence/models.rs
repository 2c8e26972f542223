//! Diesel row types and their conversions to domain entities.
//!
//! Rows mirror the schema exactly; conversions re-run domain validation so a
//! corrupted row surfaces as a query error instead of a panic or a silently
//! invalid entity.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    AuthorName, Book, EmailAddress, NewUser, Page, PageContent, PageNumber, Role, Title, User,
    UserName,
};

use super::schema::{books, pages, users};

/// A persisted user account.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(row.email)
            .map_err(|err| format!("user {} has invalid email: {err}", row.id))?;
        let name = UserName::new(row.name)
            .map_err(|err| format!("user {} has invalid name: {err}", row.id))?;
        let role = Role::from_str(&row.role)
            .map_err(|err| format!("user {} has invalid role: {err}", row.id))?;
        let draft = NewUser {
            email,
            name,
            role,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            password_hash: row.password_hash,
        };
        Ok(Self::from_parts(row.id, draft).with_active(row.is_active))
    }
}

/// Insertable user row.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub password_hash: &'a str,
}

/// Partial user update; `None` fields are left untouched.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangesetRow<'a> {
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

/// A persisted book.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookRow {
    pub id: i32,
    pub uuid: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = String;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let title = Title::new(row.title)
            .map_err(|err| format!("book {} has invalid title: {err}", row.uuid))?;
        let author = AuthorName::new(row.author)
            .map_err(|err| format!("book {} has invalid author: {err}", row.uuid))?;
        Self::from_parts(row.uuid, title, author, row.created_at, row.updated_at)
            .map_err(|err| format!("book {} has invalid timestamps: {err}", row.uuid))
    }
}

/// Insertable book row.
#[derive(Debug, Insertable)]
#[diesel(table_name = books)]
pub struct NewBookRow<'a> {
    pub uuid: Uuid,
    pub title: &'a str,
    pub author: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial book update; `updated_at` always advances with the change.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = books)]
pub struct BookChangesetRow<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted page.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PageRow {
    pub id: i32,
    pub uuid: Uuid,
    pub book_id: i32,
    pub number: i32,
    pub content: String,
}

impl PageRow {
    /// Convert to a domain page, pairing the row with its owning book's
    /// external identifier (the row itself only stores the surrogate key).
    pub fn into_domain(self, book_uuid: Uuid) -> Result<Page, String> {
        let number = PageNumber::new(i64::from(self.number))
            .map_err(|err| format!("page {} has invalid number: {err}", self.uuid))?;
        let content = PageContent::new(self.content)
            .map_err(|err| format!("page {} has invalid content: {err}", self.uuid))?;
        Ok(Page::from_parts(self.uuid, book_uuid, number, content))
    }
}

/// Insertable page row.
#[derive(Debug, Insertable)]
#[diesel(table_name = pages)]
pub struct NewPageRow<'a> {
    pub uuid: Uuid,
    pub book_id: i32,
    pub number: i32,
    pub content: &'a str,
}

/// Partial page update; `None` fields are left untouched.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = pages)]
pub struct PageChangesetRow<'a> {
    pub number: Option<i32>,
    pub content: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row-to-domain conversions.
    use super::*;

    fn user_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            name: "Test User".into(),
            role: "editor".into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[test]
    fn user_row_converts_to_domain() {
        let row = user_row();
        let id = row.id;
        let user = User::try_from(row).expect("valid row");
        assert_eq!(user.id(), id);
        assert_eq!(user.role(), Role::Editor);
        assert!(user.is_active());
    }

    #[test]
    fn user_row_with_unknown_role_is_rejected() {
        let mut row = user_row();
        row.role = "owner".into();
        let err = User::try_from(row).expect_err("unknown role");
        assert!(err.contains("invalid role"));
    }

    #[test]
    fn book_row_with_inverted_timestamps_is_rejected() {
        let now = Utc::now();
        let row = BookRow {
            id: 1,
            uuid: Uuid::new_v4(),
            title: "Test Book".into(),
            author: "Test Author".into(),
            created_at: now,
            updated_at: now - chrono::Duration::seconds(1),
        };
        let err = Book::try_from(row).expect_err("inverted timestamps");
        assert!(err.contains("invalid timestamps"));
    }

    #[test]
    fn page_row_converts_with_book_uuid() {
        let book_uuid = Uuid::new_v4();
        let row = PageRow {
            id: 1,
            uuid: Uuid::new_v4(),
            book_id: 1,
            number: 3,
            content: "text".into(),
        };
        let page = row.into_domain(book_uuid).expect("valid row");
        assert_eq!(page.book_uuid(), book_uuid);
        assert_eq!(page.number().get(), 3);
    }
}
