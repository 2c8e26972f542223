//! Book aggregate and validated field newtypes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length for book titles and author names.
pub const BOOK_FIELD_MAX: usize = 128;

/// Validation errors returned by the book constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// Title was missing or blank once trimmed.
    EmptyTitle,
    /// Title exceeds [`BOOK_FIELD_MAX`] characters.
    TitleTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// Author was missing or blank once trimmed.
    EmptyAuthor,
    /// Author exceeds [`BOOK_FIELD_MAX`] characters.
    AuthorTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// Persisted timestamps violate `updated_at >= created_at`.
    UpdatedBeforeCreated,
}

impl fmt::Display for BookValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyAuthor => write!(f, "author must not be empty"),
            Self::AuthorTooLong { max } => write!(f, "author must be at most {max} characters"),
            Self::UpdatedBeforeCreated => {
                write!(f, "updated_at must not precede created_at")
            }
        }
    }
}

impl std::error::Error for BookValidationError {}

/// Title of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Validate and construct a title.
    pub fn new(title: impl Into<String>) -> Result<Self, BookValidationError> {
        Self::from_owned(title.into())
    }

    fn from_owned(title: String) -> Result<Self, BookValidationError> {
        if title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        if title.chars().count() > BOOK_FIELD_MAX {
            return Err(BookValidationError::TitleTooLong {
                max: BOOK_FIELD_MAX,
            });
        }
        Ok(Self(title))
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Title> for String {
    fn from(value: Title) -> Self {
        value.0
    }
}

impl TryFrom<String> for Title {
    type Error = BookValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Author of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorName(String);

impl AuthorName {
    /// Validate and construct an author name.
    pub fn new(author: impl Into<String>) -> Result<Self, BookValidationError> {
        Self::from_owned(author.into())
    }

    fn from_owned(author: String) -> Result<Self, BookValidationError> {
        if author.trim().is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }
        if author.chars().count() > BOOK_FIELD_MAX {
            return Err(BookValidationError::AuthorTooLong {
                max: BOOK_FIELD_MAX,
            });
        }
        Ok(Self(author))
    }
}

impl AsRef<str> for AuthorName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AuthorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<AuthorName> for String {
    fn from(value: AuthorName) -> Self {
        value.0
    }
}

impl TryFrom<String> for AuthorName {
    type Error = BookValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Book aggregate owning an ordered collection of pages.
///
/// ## Invariants
/// - `updated_at >= created_at` at all times.
/// - `created_at` is set once and never modified.
/// - Page mutations advance `updated_at` through the repository's
///   timestamp-propagation path, committed with the page write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    uuid: Uuid,
    title: Title,
    author: AuthorName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Book {
    /// Create a fresh book with both timestamps set to `now`.
    pub fn new(draft: BookDraft, now: DateTime<Utc>) -> Self {
        let BookDraft { title, author } = draft;
        Self {
            uuid: Uuid::new_v4(),
            title,
            author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Materialise a book from persisted parts, checking timestamp order.
    pub fn from_parts(
        uuid: Uuid,
        title: Title,
        author: AuthorName,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, BookValidationError> {
        if updated_at < created_at {
            return Err(BookValidationError::UpdatedBeforeCreated);
        }
        Ok(Self {
            uuid,
            title,
            author,
            created_at,
            updated_at,
        })
    }

    /// Opaque external identifier.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Title.
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Author.
    pub fn author(&self) -> &AuthorName {
        &self.author
    }

    /// Creation timestamp, immutable after construction.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last-modified timestamp covering both metadata and page content.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a metadata change set, advancing `updated_at`.
    pub fn apply(&mut self, changes: BookChanges, now: DateTime<Utc>) {
        let BookChanges { title, author } = changes;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(author) = author {
            self.author = author;
        }
        self.touch(now);
    }

    /// Advance `updated_at` to `now` without moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Validated input for creating a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    /// Title of the new book.
    pub title: Title,
    /// Author of the new book.
    pub author: AuthorName,
}

/// Partial metadata update for an existing book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    /// Replacement title, if requested.
    pub title: Option<Title>,
    /// Replacement author, if requested.
    pub author: Option<AuthorName>,
}

impl BookChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn draft() -> BookDraft {
        BookDraft {
            title: Title::new("Test Book").expect("title"),
            author: AuthorName::new("Test Author").expect("author"),
        }
    }

    #[test]
    fn new_book_has_equal_timestamps() {
        let now = Utc::now();
        let book = Book::new(draft(), now);
        assert_eq!(book.created_at(), now);
        assert_eq!(book.updated_at(), now);
    }

    #[test]
    fn touch_advances_updated_at_monotonically() {
        let now = Utc::now();
        let mut book = Book::new(draft(), now);
        let later = now + Duration::seconds(5);
        book.touch(later);
        assert_eq!(book.updated_at(), later);

        // A clock that runs backwards must not regress the timestamp.
        book.touch(now);
        assert_eq!(book.updated_at(), later);
        assert!(book.updated_at() >= book.created_at());
    }

    #[test]
    fn apply_updates_fields_and_timestamp() {
        let now = Utc::now();
        let mut book = Book::new(draft(), now);
        let later = now + Duration::seconds(1);
        book.apply(
            BookChanges {
                title: Some(Title::new("Updated Book").expect("title")),
                author: None,
            },
            later,
        );
        assert_eq!(book.title().as_ref(), "Updated Book");
        assert_eq!(book.author().as_ref(), "Test Author");
        assert_eq!(book.updated_at(), later);
    }

    #[test]
    fn from_parts_rejects_inverted_timestamps() {
        let now = Utc::now();
        let err = Book::from_parts(
            Uuid::new_v4(),
            Title::new("t").expect("title"),
            AuthorName::new("a").expect("author"),
            now,
            now - Duration::seconds(1),
        )
        .expect_err("inverted timestamps");
        assert_eq!(err, BookValidationError::UpdatedBeforeCreated);
    }

    #[rstest]
    #[case("", BookValidationError::EmptyTitle)]
    #[case("   ", BookValidationError::EmptyTitle)]
    fn blank_titles_are_rejected(#[case] raw: &str, #[case] expected: BookValidationError) {
        assert_eq!(Title::new(raw).expect_err("blank title"), expected);
    }

    #[test]
    fn overlong_title_is_rejected() {
        let raw = "x".repeat(BOOK_FIELD_MAX + 1);
        let err = Title::new(raw).expect_err("overlong title");
        assert_eq!(
            err,
            BookValidationError::TitleTooLong {
                max: BOOK_FIELD_MAX
            }
        );
    }
}
