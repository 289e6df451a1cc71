//! Catalog facade wiring both services to one connection pool.

use super::author_service::AuthorService;
use super::title_service::TitleService;
use super::ServiceResult;
use crate::db::ConnectionPool;
use crate::store::author_store::SqliteAuthorStore;
use crate::store::title_store::SqliteTitleStore;

/// Counts shown by the catalog summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSummary {
    pub authors: usize,
    pub titles: usize,
}

/// Author and title services sharing one pool.
pub struct CatalogService {
    pub authors: AuthorService<SqliteAuthorStore>,
    pub titles: TitleService<SqliteTitleStore>,
}

impl CatalogService {
    pub fn new(pool: &ConnectionPool) -> Self {
        Self {
            authors: AuthorService::new(SqliteAuthorStore::new(pool.clone())),
            titles: TitleService::new(SqliteTitleStore::new(pool.clone())),
        }
    }

    pub fn summary(&self) -> ServiceResult<CatalogSummary> {
        Ok(CatalogSummary {
            authors: self.authors.list_authors()?.len(),
            titles: self.titles.list_titles()?.len(),
        })
    }
}
