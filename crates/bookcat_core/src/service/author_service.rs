//! Author use-case service.
//!
//! # Invariants
//! - Names are trimmed and must be non-blank before persistence.
//! - Update is read-modify-write over the stored record.

use super::input::require_text;
use super::{ServiceError, ServiceResult};
use crate::model::author::{is_valid_author_id, Author, AuthorId};
use crate::model::title::Title;
use crate::store::author_store::AuthorStore;
use crate::store::error::EntityKey;
use log::{debug, info};

/// Use-case service wrapper for author operations.
pub struct AuthorService<S: AuthorStore> {
    store: S,
}

impl<S: AuthorStore> AuthorService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list_authors(&self) -> ServiceResult<Vec<Author>> {
        Ok(self.store.list_all()?)
    }

    pub fn get_author(&self, id: AuthorId) -> ServiceResult<Option<Author>> {
        Ok(self.store.get_by_id(id)?)
    }

    /// Creates an author and returns it with its assigned id.
    pub fn add_author(&self, first_name: &str, last_name: &str) -> ServiceResult<Author> {
        let first_name = require_text("first_name", first_name)?;
        let last_name = require_text("last_name", last_name)?;
        let author = self.store.insert(first_name, last_name)?;
        info!("event=author_add module=service status=ok author_id={}", author.id);
        Ok(author)
    }

    /// Replaces both names of an existing author.
    ///
    /// # Contract
    /// - Input is validated before the existing record is fetched.
    /// - Returns `NotFound` when `id` does not exist.
    pub fn update_author(
        &self,
        id: AuthorId,
        first_name: &str,
        last_name: &str,
    ) -> ServiceResult<Author> {
        let first_name = require_text("first_name", first_name)?;
        let last_name = require_text("last_name", last_name)?;

        let mut author = self.require_author(id)?;
        author.first_name = first_name.to_string();
        author.last_name = last_name.to_string();
        self.store
            .update(author.id, &author.first_name, &author.last_name)?;
        Ok(author)
    }

    /// Deletes an author. Fails with a foreign-key persistence error while
    /// any title still lists the author.
    pub fn delete_author(&self, id: AuthorId) -> ServiceResult<()> {
        self.require_author(id)?;
        self.store.delete(id)?;
        info!("event=author_delete module=service status=ok author_id={id}");
        Ok(())
    }

    /// Titles credited to `author_id`; invalid ids give an empty list.
    pub fn titles_by_author(&self, author_id: AuthorId) -> ServiceResult<Vec<Title>> {
        if !is_valid_author_id(author_id) {
            debug!("event=author_titles module=service status=skipped author_id={author_id}");
            return Ok(Vec::new());
        }
        Ok(self.store.list_titles_for(author_id)?)
    }

    fn require_author(&self, id: AuthorId) -> ServiceResult<Author> {
        self.store
            .get_by_id(id)?
            .ok_or(ServiceError::NotFound(EntityKey::Author(id)))
    }
}
