//! Domain primitives, aggregates, and ports.
//!
//! Types here are transport and storage agnostic. Each validated newtype
//! documents its invariants; serde derives describe the wire contract where
//! one exists. Adapters in `inbound` and `outbound` translate to HTTP and
//! PostgreSQL respectively.

pub mod auth;
pub mod book;
pub mod error;
pub mod page;
pub mod policy;
pub mod ports;
pub mod user;

pub use auth::{Actor, Credentials, CredentialsValidationError};
pub use book::{AuthorName, Book, BookChanges, BookDraft, BookValidationError, Title};
pub use error::{Error, ErrorCode};
pub use page::{Page, PageChanges, PageContent, PageDraft, PageNumber, PageValidationError};
pub use policy::{authorize, AccessMethod};
pub use user::{
    EmailAddress, NewUser, Role, User, UserChanges, UserName, UserValidationError, PASSWORD_MIN,
};
