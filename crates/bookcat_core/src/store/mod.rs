//! Store layer: catalog persistence over the connection pool.
//!
//! # Responsibility
//! - Define use-case oriented persistence contracts for authors and titles.
//! - Isolate SQLite query details from service orchestration.
//! - Translate storage failures into the `StoreError` taxonomy.
//!
//! # Invariants
//! - Reads return `Ok(None)` or an empty list for missing rows, never an error.
//! - Writes that address a missing row return `StoreError::NotFound`.
//! - No `rusqlite` error type crosses this module's public API.

pub mod author_store;
pub mod error;
pub mod title_store;
mod unit_of_work;
