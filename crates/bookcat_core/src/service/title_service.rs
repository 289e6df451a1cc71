//! Title use-case service.
//!
//! # Invariants
//! - isbn, name and copyright year are trimmed and non-blank.
//! - Edition numbers are non-negative.
//! - The author id set is non-empty and positive on create and update.
//! - Update is read-modify-write: fetch, apply `TitleChanges`, persist.

use super::input::{require_author_ids, require_edition_number, require_text};
use super::{ServiceError, ServiceResult};
use crate::model::author::{Author, AuthorId};
use crate::model::title::{Title, TitleChanges};
use crate::store::error::EntityKey;
use crate::store::title_store::TitleStore;
use log::info;

/// Use-case service wrapper for title operations.
pub struct TitleService<S: TitleStore> {
    store: S,
}

impl<S: TitleStore> TitleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list_titles(&self) -> ServiceResult<Vec<Title>> {
        Ok(self.store.list_all()?)
    }

    pub fn get_title(&self, isbn: &str) -> ServiceResult<Option<Title>> {
        Ok(self.store.get_by_isbn(isbn.trim())?)
    }

    pub fn authors_for_title(&self, isbn: &str) -> ServiceResult<Vec<Author>> {
        Ok(self.store.list_authors_for(isbn.trim())?)
    }

    /// Creates a title linked to `author_ids` and returns the stored shape.
    pub fn add_title(&self, title: &Title, author_ids: &[AuthorId]) -> ServiceResult<Title> {
        let title = normalize_title(title)?;
        require_author_ids(author_ids)?;

        self.store.create(&title, author_ids)?;
        info!(
            "event=title_add module=service status=ok isbn={} authors={}",
            title.isbn,
            author_ids.len()
        );
        Ok(title)
    }

    /// Applies `changes` to the stored title and replaces its author set.
    ///
    /// # Contract
    /// - Input is validated before the existing record is fetched.
    /// - Returns `NotFound` when `isbn` does not exist.
    pub fn update_title(
        &self,
        isbn: &str,
        changes: &TitleChanges,
        new_author_ids: &[AuthorId],
    ) -> ServiceResult<Title> {
        let isbn = require_text("isbn", isbn)?;
        let changes = TitleChanges {
            name: require_text("name", &changes.name)?.to_string(),
            edition_number: require_edition_number(changes.edition_number)?,
            copyright_year: require_text("copyright_year", &changes.copyright_year)?.to_string(),
        };
        require_author_ids(new_author_ids)?;

        let mut title = self.require_title(isbn)?;
        changes.apply_to(&mut title);
        self.store.update(&title, new_author_ids)?;
        info!(
            "event=title_update module=service status=ok isbn={} authors={}",
            title.isbn,
            new_author_ids.len()
        );
        Ok(title)
    }

    pub fn delete_title(&self, isbn: &str) -> ServiceResult<()> {
        let isbn = require_text("isbn", isbn)?;
        self.require_title(isbn)?;
        self.store.delete(isbn)?;
        info!("event=title_delete module=service status=ok isbn={isbn}");
        Ok(())
    }

    fn require_title(&self, isbn: &str) -> ServiceResult<Title> {
        self.store
            .get_by_isbn(isbn)?
            .ok_or_else(|| ServiceError::NotFound(EntityKey::Title(isbn.to_string())))
    }
}

fn normalize_title(title: &Title) -> ServiceResult<Title> {
    Ok(Title {
        isbn: require_text("isbn", &title.isbn)?.to_string(),
        name: require_text("name", &title.name)?.to_string(),
        edition_number: require_edition_number(title.edition_number)?,
        copyright_year: require_text("copyright_year", &title.copyright_year)?.to_string(),
    })
}
