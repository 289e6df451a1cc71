//! SQLite connection provider and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog.
//! - Hand out pooled connections with scoped release.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Stores must not read/write catalog data before migrations succeed.
//! - A released connection never carries an open transaction.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod pool;

pub use open::{open_connection, open_db, open_db_in_memory, DbTarget};
pub use pool::{ConnectionPool, PoolStatus, PooledConnection};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    InvalidPoolSize(usize),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidPoolSize(size) => {
                write!(f, "connection pool size must be at least 1, got {size}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::InvalidPoolSize(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Failure to obtain a usable connection from the provider.
///
/// Fatal to the current operation and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    /// Opening or bootstrapping a fresh connection failed.
    Open(String),
    /// Every connection stayed checked out past the acquire timeout.
    Timeout { waited_ms: u128 },
    /// The pool has been shut down.
    Closed,
}

impl Display for ConnectivityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(message) => write!(f, "failed to open database connection: {message}"),
            Self::Timeout { waited_ms } => {
                write!(f, "no database connection available after {waited_ms} ms")
            }
            Self::Closed => write!(f, "connection pool is shut down"),
        }
    }
}

impl Error for ConnectivityError {}
