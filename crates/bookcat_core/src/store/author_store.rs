//! Author store contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `authors` table, one statement per call.
//! - Join lookup of titles credited to one author.
//!
//! # Invariants
//! - Ids are assigned by storage on insert.
//! - Deleting an author that still has association rows is rejected by the
//!   foreign key and surfaces as `ForeignKeyViolation`; nothing cascades.

use super::error::{EntityKey, StoreError, StoreResult};
use super::title_store::title_from_row;
use super::unit_of_work::with_connection;
use crate::db::ConnectionPool;
use crate::model::author::{is_valid_author_id, Author, AuthorId};
use crate::model::title::Title;
use log::debug;
use rusqlite::{params, OptionalExtension, Row};

pub(crate) const AUTHOR_COLUMNS: &str = "a.id, a.first_name, a.last_name";

/// Persistence contract for authors.
pub trait AuthorStore {
    /// All authors ordered by id; empty when none exist.
    fn list_all(&self) -> StoreResult<Vec<Author>>;
    fn get_by_id(&self, id: AuthorId) -> StoreResult<Option<Author>>;
    fn insert(&self, first_name: &str, last_name: &str) -> StoreResult<Author>;
    /// `Err(NotFound)` when no row has `id`.
    fn update(&self, id: AuthorId, first_name: &str, last_name: &str) -> StoreResult<()>;
    /// `Err(NotFound)` when no row has `id`.
    fn delete(&self, id: AuthorId) -> StoreResult<()>;
    /// Titles linked to `author_id`, ordered by isbn. Ids `<= 0` yield an
    /// empty list without touching storage.
    fn list_titles_for(&self, author_id: AuthorId) -> StoreResult<Vec<Title>>;
}

/// SQLite-backed author store.
#[derive(Clone)]
pub struct SqliteAuthorStore {
    pool: ConnectionPool,
}

impl SqliteAuthorStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

impl AuthorStore for SqliteAuthorStore {
    fn list_all(&self) -> StoreResult<Vec<Author>> {
        with_connection(&self.pool, "author_list", |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {AUTHOR_COLUMNS} FROM authors a ORDER BY a.id ASC;"
            ))?;
            let authors = stmt
                .query_map([], author_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(authors)
        })
    }

    fn get_by_id(&self, id: AuthorId) -> StoreResult<Option<Author>> {
        with_connection(&self.pool, "author_get", |conn| {
            conn.query_row(
                &format!("SELECT {AUTHOR_COLUMNS} FROM authors a WHERE a.id = ?1;"),
                [id],
                author_from_row,
            )
            .optional()
        })
    }

    fn insert(&self, first_name: &str, last_name: &str) -> StoreResult<Author> {
        let author = with_connection(&self.pool, "author_insert", |conn| {
            conn.execute(
                "INSERT INTO authors (first_name, last_name) VALUES (?1, ?2);",
                params![first_name, last_name],
            )?;
            Ok(Author {
                id: conn.last_insert_rowid(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            })
        })?;
        debug!("event=author_insert module=store status=ok author_id={}", author.id);
        Ok(author)
    }

    fn update(&self, id: AuthorId, first_name: &str, last_name: &str) -> StoreResult<()> {
        let changed = with_connection(&self.pool, "author_update", |conn| {
            conn.execute(
                "UPDATE authors SET first_name = ?1, last_name = ?2 WHERE id = ?3;",
                params![first_name, last_name, id],
            )
        })?;

        if changed == 0 {
            return Err(StoreError::NotFound(EntityKey::Author(id)));
        }

        Ok(())
    }

    fn delete(&self, id: AuthorId) -> StoreResult<()> {
        let changed = with_connection(&self.pool, "author_delete", |conn| {
            conn.execute("DELETE FROM authors WHERE id = ?1;", [id])
        })?;

        if changed == 0 {
            return Err(StoreError::NotFound(EntityKey::Author(id)));
        }

        debug!("event=author_delete module=store status=ok author_id={id}");
        Ok(())
    }

    fn list_titles_for(&self, author_id: AuthorId) -> StoreResult<Vec<Title>> {
        if !is_valid_author_id(author_id) {
            return Ok(Vec::new());
        }

        with_connection(&self.pool, "author_list_titles", |conn| {
            let mut stmt = conn.prepare(
                "SELECT t.isbn, t.name, t.edition_number, t.copyright_year
                 FROM titles t
                 INNER JOIN author_titles at ON at.isbn = t.isbn
                 WHERE at.author_id = ?1
                 ORDER BY t.isbn ASC;",
            )?;
            let titles = stmt
                .query_map([author_id], title_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(titles)
        })
    }
}

pub(crate) fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
    })
}
