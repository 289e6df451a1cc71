//! Catalog domain model.
//!
//! # Invariants
//! - `Author::id` is assigned by storage and never reused.
//! - `Title::isbn` is caller-assigned and is the title primary key.

pub mod author;
pub mod title;
