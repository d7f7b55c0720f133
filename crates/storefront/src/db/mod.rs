//! Database operations for the account store.
//!
//! # Database: `accounts.db`
//!
//! A single-file SQLite database holding the relational side of the
//! storefront. Sessions and per-user collections live in the key-value
//! store, not here.
//!
//! ## Tables
//!
//! - `accounts` - Profile rows for both auth modes; `password_hash` is only
//!   set for self-managed accounts
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p giftbox-cli -- migrate
//! ```

mod accounts;

use std::str::FromStr;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use accounts::AccountRepository;

/// Embedded migrations, compiled in from `migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying embedded migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The addressed row does not exist.
    #[error("not found")]
    NotFound,

    /// A stored value failed validation on the way out of the database.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a SQLite connection pool, creating the database file if needed.
///
/// The pool holds exactly one connection: SQLite serializes writes, and
/// `sqlite::memory:` databases live and die with their connection.
///
/// # Arguments
///
/// * `database_url` - SQLite connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// Apply any pending embedded migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
