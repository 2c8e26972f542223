//! Page entity belonging to a [`Book`](crate::domain::Book).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length for page content.
pub const PAGE_CONTENT_MAX: usize = 2048;

/// Validation errors returned by the page constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageValidationError {
    /// Page numbers start at 1; zero and negatives are rejected at input
    /// validation, before the repository is consulted.
    InvalidNumber,
    /// Content was empty.
    EmptyContent,
    /// Content exceeds [`PAGE_CONTENT_MAX`] characters.
    ContentTooLong {
        /// Permitted maximum.
        max: usize,
    },
}

impl fmt::Display for PageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber => write!(f, "page number must be a positive integer"),
            Self::EmptyContent => write!(f, "content must not be empty"),
            Self::ContentTooLong { max } => {
                write!(f, "content must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for PageValidationError {}

/// Positive 1-based page number, unique within a book.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct PageNumber(i32);

impl PageNumber {
    /// Validate and construct a page number.
    pub fn new(number: i64) -> Result<Self, PageValidationError> {
        let number = i32::try_from(number).map_err(|_| PageValidationError::InvalidNumber)?;
        if number < 1 {
            return Err(PageValidationError::InvalidNumber);
        }
        Ok(Self(number))
    }

    /// Underlying value as stored in the database.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PageNumber> for i64 {
    fn from(value: PageNumber) -> Self {
        Self::from(value.0)
    }
}

impl TryFrom<i64> for PageNumber {
    type Error = PageValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Bounded page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageContent(String);

impl PageContent {
    /// Validate and construct page content.
    pub fn new(content: impl Into<String>) -> Result<Self, PageValidationError> {
        Self::from_owned(content.into())
    }

    fn from_owned(content: String) -> Result<Self, PageValidationError> {
        if content.is_empty() {
            return Err(PageValidationError::EmptyContent);
        }
        if content.chars().count() > PAGE_CONTENT_MAX {
            return Err(PageValidationError::ContentTooLong {
                max: PAGE_CONTENT_MAX,
            });
        }
        Ok(Self(content))
    }
}

impl AsRef<str> for PageContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PageContent> for String {
    fn from(value: PageContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for PageContent {
    type Error = PageValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A page of a book.
///
/// ## Invariants
/// - `(book, number)` pairs are unique; the repository enforces this with a
///   database constraint so concurrent creations cannot both succeed.
/// - A page holds a non-owning reference back to its book; deleting the book
///   deletes the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    uuid: Uuid,
    book_uuid: Uuid,
    number: PageNumber,
    content: PageContent,
}

impl Page {
    /// Create a fresh page belonging to `book_uuid`.
    pub fn new(book_uuid: Uuid, draft: PageDraft) -> Self {
        let PageDraft { number, content } = draft;
        Self {
            uuid: Uuid::new_v4(),
            book_uuid,
            number,
            content,
        }
    }

    /// Materialise a page from persisted parts.
    pub fn from_parts(
        uuid: Uuid,
        book_uuid: Uuid,
        number: PageNumber,
        content: PageContent,
    ) -> Self {
        Self {
            uuid,
            book_uuid,
            number,
            content,
        }
    }

    /// Opaque external identifier.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// External identifier of the owning book.
    pub fn book_uuid(&self) -> Uuid {
        self.book_uuid
    }

    /// Page number within the book.
    pub fn number(&self) -> PageNumber {
        self.number
    }

    /// Page content.
    pub fn content(&self) -> &PageContent {
        &self.content
    }

    /// Apply a change set in place.
    pub fn apply(&mut self, changes: PageChanges) {
        let PageChanges { number, content } = changes;
        if let Some(number) = number {
            self.number = number;
        }
        if let Some(content) = content {
            self.content = content;
        }
    }
}

/// Validated input for creating a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDraft {
    /// 1-based page number.
    pub number: PageNumber,
    /// Page content.
    pub content: PageContent,
}

/// Partial update for an existing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageChanges {
    /// Replacement number; triggers a uniqueness re-check when present.
    pub number: Option<PageNumber>,
    /// Replacement content, if requested.
    pub content: Option<PageContent>,
}

impl PageChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.content.is_none()
    }
}
