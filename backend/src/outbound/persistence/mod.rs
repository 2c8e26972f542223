//! PostgreSQL persistence adapters.

mod diesel_book_repository;
mod diesel_user_repository;
mod error_mapping;
pub mod migrations;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_book_repository::DieselBookRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
