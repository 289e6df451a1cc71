//! Store-boundary error taxonomy.
//!
//! Raw `rusqlite::Error` values are translated here and never cross the
//! store API. Each translation is logged once at the boundary.

use crate::db::ConnectivityError;
use crate::logging::sanitize_message;
use crate::model::author::AuthorId;
use log::error;
use rusqlite::{ffi, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_ERROR_MESSAGE_CHARS: usize = 240;
const FOREIGN_KEY_FAILURE: &str = "FOREIGN KEY constraint failed";

pub type StoreResult<T> = Result<T, StoreError>;

/// Key of the entity an operation addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKey {
    Author(AuthorId),
    Title(String),
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Author(id) => write!(f, "author {id}"),
            Self::Title(isbn) => write!(f, "title {isbn}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceErrorKind {
    /// Primary key or unique constraint hit (duplicate isbn, duplicate link).
    DuplicateKey,
    /// Link to a missing row, or delete of a still-referenced row.
    ForeignKeyViolation,
    ConstraintViolation,
    /// A write that must touch a row touched none.
    NoRowsAffected,
    Storage,
}

impl PersistenceErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateKey => "duplicate_key",
            Self::ForeignKeyViolation => "foreign_key_violation",
            Self::ConstraintViolation => "constraint_violation",
            Self::NoRowsAffected => "no_rows_affected",
            Self::Storage => "storage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceError {
    pub operation: &'static str,
    pub kind: PersistenceErrorKind,
    pub message: String,
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} failed ({}): {}",
            self.operation,
            self.kind.as_str(),
            self.message
        )
    }
}

impl Error for PersistenceError {}

/// Tagged outcome of a failed store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(EntityKey),
    Persistence(PersistenceError),
    Connectivity(ConnectivityError),
}

impl StoreError {
    /// Translates and logs a SQLite failure raised inside `operation`.
    pub(crate) fn from_sqlite(operation: &'static str, err: rusqlite::Error) -> Self {
        let persistence = PersistenceError {
            operation,
            kind: classify(&err),
            message: sanitize_message(&err.to_string(), MAX_ERROR_MESSAGE_CHARS),
        };
        error!(
            "event={operation} module=store status=error error_kind={} error={}",
            persistence.kind.as_str(),
            persistence.message
        );
        Self::Persistence(persistence)
    }

    pub(crate) fn no_rows(operation: &'static str, message: String) -> Self {
        error!("event={operation} module=store status=error error_kind=no_rows_affected error={message}");
        Self::Persistence(PersistenceError {
            operation,
            kind: PersistenceErrorKind::NoRowsAffected,
            message,
        })
    }

    pub(crate) fn connectivity(operation: &'static str, err: ConnectivityError) -> Self {
        error!("event={operation} module=store status=error error_kind=connectivity error={err}");
        Self::Connectivity(err)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Persistence kind, when this is a persistence failure.
    pub fn persistence_kind(&self) -> Option<PersistenceErrorKind> {
        match self {
            Self::Persistence(err) => Some(err.kind),
            _ => None,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "{key} not found"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Connectivity(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Persistence(err) => Some(err),
            Self::Connectivity(err) => Some(err),
        }
    }
}

fn classify(err: &rusqlite::Error) -> PersistenceErrorKind {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    PersistenceErrorKind::DuplicateKey
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => PersistenceErrorKind::ForeignKeyViolation,
                // `ON DELETE RESTRICT` actions are raised through an internal trigger.
                ffi::SQLITE_CONSTRAINT_TRIGGER
                    if message
                        .as_deref()
                        .is_some_and(|text| text.contains(FOREIGN_KEY_FAILURE)) =>
                {
                    PersistenceErrorKind::ForeignKeyViolation
                }
                _ => PersistenceErrorKind::ConstraintViolation,
            }
        }
        _ => PersistenceErrorKind::Storage,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, PersistenceErrorKind, StoreError};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    fn failing_insert(sql_setup: &str, insert: &str) -> rusqlite::Error {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql_setup).unwrap();
        conn.execute_batch(insert).unwrap_err()
    }

    #[test]
    fn primary_key_collision_is_duplicate_key() {
        let err = failing_insert(
            "CREATE TABLE t (k TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');",
            "INSERT INTO t VALUES ('a');",
        );
        assert_eq!(classify(&err), PersistenceErrorKind::DuplicateKey);
    }

    #[test]
    fn dangling_reference_is_foreign_key_violation() {
        let err = failing_insert(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE p (id INTEGER PRIMARY KEY);
             CREATE TABLE c (p_id INTEGER NOT NULL REFERENCES p(id));",
            "INSERT INTO c VALUES (42);",
        );
        assert_eq!(classify(&err), PersistenceErrorKind::ForeignKeyViolation);
    }

    #[test]
    fn deleting_referenced_author_is_foreign_key_violation() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO authors (id, first_name, last_name) VALUES (1, 'Paul', 'Deitel');
             INSERT INTO titles (isbn, name, edition_number, copyright_year)
             VALUES ('0-13-1', 'Intro', 1, '2020');
             INSERT INTO author_titles (author_id, isbn) VALUES (1, '0-13-1');",
        )
        .unwrap();

        let err = conn
            .execute("DELETE FROM authors WHERE id = 1;", [])
            .unwrap_err();
        assert_eq!(classify(&err), PersistenceErrorKind::ForeignKeyViolation);

        let err = conn
            .execute("DELETE FROM titles WHERE isbn = '0-13-1';", [])
            .unwrap_err();
        assert_eq!(classify(&err), PersistenceErrorKind::ForeignKeyViolation);
    }

    #[test]
    fn restrict_action_is_foreign_key_violation() {
        let err = failing_insert(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE p (id INTEGER PRIMARY KEY);
             CREATE TABLE c (p_id INTEGER NOT NULL REFERENCES p(id) ON DELETE RESTRICT);
             INSERT INTO p VALUES (1);
             INSERT INTO c VALUES (1);",
            "DELETE FROM p WHERE id = 1;",
        );
        assert_eq!(classify(&err), PersistenceErrorKind::ForeignKeyViolation);
    }

    #[test]
    fn not_null_is_generic_constraint_violation() {
        let err = failing_insert(
            "CREATE TABLE t (k TEXT NOT NULL);",
            "INSERT INTO t VALUES (NULL);",
        );
        assert_eq!(classify(&err), PersistenceErrorKind::ConstraintViolation);
    }

    #[test]
    fn translated_error_keeps_operation_and_single_line_message() {
        let err = failing_insert("", "SELECT * FROM missing_table;");
        let translated = StoreError::from_sqlite("title_list", err);
        match translated {
            StoreError::Persistence(persistence) => {
                assert_eq!(persistence.operation, "title_list");
                assert_eq!(persistence.kind, PersistenceErrorKind::Storage);
                assert!(!persistence.message.contains('\n'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
