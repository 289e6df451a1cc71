//! Title store contract and SQLite implementation.
//!
//! # Responsibility
//! - Keep `titles` and the `author_titles` association rows consistent as
//!   one unit for create, update and delete.
//! - Serve single-statement title reads.
//!
//! # Invariants
//! - This store is the only writer of `author_titles`.
//! - Every write runs in one immediate transaction; any failed step rolls
//!   the whole unit back.
//! - `update` replaces the association set (wipe, then reinsert); it never
//!   merges with the previous set.
//! - Author ids are not deduplicated: a repeated id hits the pair primary
//!   key and aborts the unit of work.

use super::author_store::{author_from_row, AUTHOR_COLUMNS};
use super::error::{EntityKey, StoreError, StoreResult};
use super::unit_of_work::{run_unit_of_work, with_connection, StepError};
use crate::db::ConnectionPool;
use crate::model::author::{Author, AuthorId};
use crate::model::title::Title;
use log::debug;
use rusqlite::{params, OptionalExtension, Row, Transaction};

const TITLE_SELECT_SQL: &str = "SELECT isbn, name, edition_number, copyright_year FROM titles";

/// Persistence contract for titles and their author links.
pub trait TitleStore {
    /// All titles ordered by isbn.
    fn list_all(&self) -> StoreResult<Vec<Title>>;
    fn get_by_isbn(&self, isbn: &str) -> StoreResult<Option<Title>>;
    /// Authors linked to `isbn`, ordered by id; empty for unknown isbn.
    fn list_authors_for(&self, isbn: &str) -> StoreResult<Vec<Author>>;
    /// Inserts the title and one link per id atomically.
    fn create(&self, title: &Title, author_ids: &[AuthorId]) -> StoreResult<()>;
    /// Updates mutable fields and replaces the full link set atomically.
    fn update(&self, title: &Title, new_author_ids: &[AuthorId]) -> StoreResult<()>;
    /// Removes links, then the title row, atomically.
    fn delete(&self, isbn: &str) -> StoreResult<()>;
}

/// SQLite-backed title store.
#[derive(Clone)]
pub struct SqliteTitleStore {
    pool: ConnectionPool,
}

impl SqliteTitleStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

impl TitleStore for SqliteTitleStore {
    fn list_all(&self) -> StoreResult<Vec<Title>> {
        with_connection(&self.pool, "title_list", |conn| {
            let mut stmt = conn.prepare(&format!("{TITLE_SELECT_SQL} ORDER BY isbn ASC;"))?;
            let titles = stmt
                .query_map([], title_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(titles)
        })
    }

    fn get_by_isbn(&self, isbn: &str) -> StoreResult<Option<Title>> {
        with_connection(&self.pool, "title_get", |conn| {
            conn.query_row(
                &format!("{TITLE_SELECT_SQL} WHERE isbn = ?1;"),
                [isbn],
                title_from_row,
            )
            .optional()
        })
    }

    fn list_authors_for(&self, isbn: &str) -> StoreResult<Vec<Author>> {
        with_connection(&self.pool, "title_list_authors", |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {AUTHOR_COLUMNS}
                 FROM authors a
                 INNER JOIN author_titles at ON at.author_id = a.id
                 WHERE at.isbn = ?1
                 ORDER BY a.id ASC;"
            ))?;
            let authors = stmt
                .query_map([isbn], author_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(authors)
        })
    }

    fn create(&self, title: &Title, author_ids: &[AuthorId]) -> StoreResult<()> {
        run_unit_of_work(&self.pool, "title_create", &title.isbn, |tx| {
            let inserted = tx.execute(
                "INSERT INTO titles (isbn, name, edition_number, copyright_year)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    title.isbn,
                    title.name,
                    title.edition_number,
                    title.copyright_year
                ],
            )?;
            if inserted == 0 {
                return Err(StoreError::no_rows(
                    "title_create",
                    format!("title {} was not inserted", title.isbn),
                )
                .into());
            }

            insert_links(tx, "title_create", &title.isbn, author_ids)
        })
    }

    fn update(&self, title: &Title, new_author_ids: &[AuthorId]) -> StoreResult<()> {
        run_unit_of_work(&self.pool, "title_update", &title.isbn, |tx| {
            let updated = tx.execute(
                "UPDATE titles
                 SET name = ?1, edition_number = ?2, copyright_year = ?3
                 WHERE isbn = ?4;",
                params![
                    title.name,
                    title.edition_number,
                    title.copyright_year,
                    title.isbn
                ],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound(EntityKey::Title(title.isbn.clone())).into());
            }

            let unlinked = tx.execute(
                "DELETE FROM author_titles WHERE isbn = ?1;",
                [title.isbn.as_str()],
            )?;
            debug!(
                "event=title_update module=store status=links_cleared isbn={} removed={unlinked}",
                title.isbn
            );

            insert_links(tx, "title_update", &title.isbn, new_author_ids)
        })
    }

    fn delete(&self, isbn: &str) -> StoreResult<()> {
        run_unit_of_work(&self.pool, "title_delete", isbn, |tx| {
            // Links go first: the foreign key does not cascade from titles.
            let unlinked = tx.execute("DELETE FROM author_titles WHERE isbn = ?1;", [isbn])?;
            let deleted = tx.execute("DELETE FROM titles WHERE isbn = ?1;", [isbn])?;
            if deleted == 0 {
                return Err(StoreError::NotFound(EntityKey::Title(isbn.to_string())).into());
            }

            debug!(
                "event=title_delete module=store status=links_cleared isbn={isbn} removed={unlinked}"
            );
            Ok(())
        })
    }
}

/// Inserts one association row per id through a single cached statement.
///
/// Any execution that does not insert exactly one row aborts the batch.
fn insert_links(
    tx: &Transaction<'_>,
    operation: &'static str,
    isbn: &str,
    author_ids: &[AuthorId],
) -> Result<(), StepError> {
    let mut stmt =
        tx.prepare_cached("INSERT INTO author_titles (author_id, isbn) VALUES (?1, ?2);")?;
    for (position, author_id) in author_ids.iter().enumerate() {
        let inserted = stmt.execute(params![author_id, isbn])?;
        if inserted != 1 {
            return Err(StoreError::no_rows(
                operation,
                format!("link {position} (author {author_id}, isbn {isbn}) inserted {inserted} rows"),
            )
            .into());
        }
    }

    debug!(
        "event={operation} module=store status=links_inserted isbn={isbn} count={}",
        author_ids.len()
    );
    Ok(())
}

pub(crate) fn title_from_row(row: &Row<'_>) -> rusqlite::Result<Title> {
    Ok(Title {
        isbn: row.get(0)?,
        name: row.get(1)?,
        edition_number: row.get(2)?,
        copyright_year: row.get(3)?,
    })
}
