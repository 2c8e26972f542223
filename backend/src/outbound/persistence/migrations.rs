//! Embedded schema migrations.
//!
//! Migrations run over a synchronous connection before the async pool is
//! built, so callers should wrap [`run_pending_migrations`] in
//! `spawn_blocking` when already inside a runtime.

use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

/// All migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open a connection to run migrations over.
    #[error("failed to connect for migrations: {0}")]
    Connection(String),

    /// A migration failed to apply.
    #[error("failed to run migrations: {0}")]
    Migration(String),
}

/// Apply any migrations not yet recorded in the target database.
///
/// # Errors
///
/// Returns [`MigrationError`] when the connection cannot be established or a
/// migration fails partway; already-applied migrations are skipped.
pub fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| MigrationError::Connection(err.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Migration(err.to_string()))?;
    Ok(())
}
