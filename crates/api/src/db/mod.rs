//! Database operations for the StorePulse `SQLite` store.
//!
//! ## Tables
//!
//! - `users` - Accounts (admin, user, store_owner) with credential hashes
//! - `stores` - Rateable stores
//! - `ratings` - One row per (user, store) pair, enforced by a unique constraint
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time via [`MIGRATOR`]; the server runs them on startup.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub mod ratings;
pub mod stores;
pub mod users;

pub use ratings::RatingRepository;
pub use stores::StoreRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Sort direction shared by the store and user catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a `sortOrder` query parameter; anything but "desc" is ascending.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(p) if p.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub(crate) const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl RepositoryError {
    /// Map a sqlx error, turning unique-constraint violations into
    /// [`RepositoryError::Conflict`] with the given message.
    pub(crate) fn from_sqlx(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Foreign-key enforcement is switched on explicitly; rating cascade on
/// store/user deletion depends on it.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(10));

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
