//! HTTP inbound adapter: handlers, DTOs, and request plumbing.

pub mod auth;
pub mod books;
pub mod error;
pub mod health;
pub mod pages;
pub mod state;
pub mod users;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

pub use auth::{AuthContext, JwtCodec};
pub use error::ApiResult;
pub use state::HttpState;
