//! Core persistence and use-case logic for the book catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{CatalogConfig, ConfigError, DatabaseConfig, LoggingConfig};
pub use db::{ConnectionPool, ConnectivityError, DbError, DbResult, PooledConnection};
pub use logging::{default_log_level, init_logging, logging_status, LogSink, LoggingError};
pub use model::author::{Author, AuthorId};
pub use model::title::{Title, TitleChanges};
pub use service::author_service::AuthorService;
pub use service::catalog_service::{CatalogService, CatalogSummary};
pub use service::input::{parse_author_id, parse_author_ids, parse_edition_number, ValidationError};
pub use service::title_service::TitleService;
pub use service::{ServiceError, ServiceResult};
pub use store::author_store::{AuthorStore, SqliteAuthorStore};
pub use store::error::{EntityKey, PersistenceError, PersistenceErrorKind, StoreError, StoreResult};
pub use store::title_store::{SqliteTitleStore, TitleStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
