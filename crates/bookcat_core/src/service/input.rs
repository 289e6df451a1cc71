//! Caller input checks and parsing.
//!
//! # Responsibility
//! - Reject malformed input before any storage call.
//! - Parse text form values (ids, id lists, edition numbers).
//!
//! # Invariants
//! - Accepted author ids are strictly positive.
//! - Parsed id lists keep input order and are never empty.

use crate::model::author::{is_valid_author_id, AuthorId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static UNSIGNED_INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\+?([0-9]+)\s*$").expect("valid unsigned integer regex"));

/// Caller input rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    BlankField(&'static str),
    /// A title needs at least one author.
    NoAuthors,
    InvalidAuthorId(String),
    InvalidEditionNumber(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::NoAuthors => write!(f, "at least one author id is required"),
            Self::InvalidAuthorId(raw) => write!(f, "invalid author id: `{raw}`"),
            Self::InvalidEditionNumber(raw) => write!(f, "invalid edition number: `{raw}`"),
        }
    }
}

impl Error for ValidationError {}

/// Returns the trimmed value, or `BlankField(field)` when nothing remains.
pub fn require_text<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed)
}

/// Checks an already-typed id list: non-empty, every id positive.
pub fn require_author_ids(author_ids: &[AuthorId]) -> Result<(), ValidationError> {
    if author_ids.is_empty() {
        return Err(ValidationError::NoAuthors);
    }
    if let Some(bad) = author_ids.iter().find(|id| !is_valid_author_id(**id)) {
        return Err(ValidationError::InvalidAuthorId(bad.to_string()));
    }
    Ok(())
}

/// Checks a typed edition number; the same bound as the text form.
pub fn require_edition_number(edition_number: i32) -> Result<i32, ValidationError> {
    if edition_number < 0 {
        return Err(ValidationError::InvalidEditionNumber(edition_number.to_string()));
    }
    Ok(edition_number)
}

/// Parses one positive author id from text.
pub fn parse_author_id(raw: &str) -> Result<AuthorId, ValidationError> {
    let invalid = || ValidationError::InvalidAuthorId(raw.trim().to_string());
    let digits = UNSIGNED_INTEGER_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .ok_or_else(invalid)?;
    let id = digits.as_str().parse::<AuthorId>().map_err(|_| invalid())?;
    if !is_valid_author_id(id) {
        return Err(invalid());
    }
    Ok(id)
}

/// Parses a comma separated id list such as `"1, 2,3"`.
///
/// Empty segments are skipped; duplicates are kept so the store can reject
/// them.
pub fn parse_author_ids(raw: &str) -> Result<Vec<AuthorId>, ValidationError> {
    let ids = raw
        .split(',')
        .filter(|segment| !segment.trim().is_empty())
        .map(parse_author_id)
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err(ValidationError::NoAuthors);
    }
    Ok(ids)
}

/// Parses a non-negative edition number from text.
pub fn parse_edition_number(raw: &str) -> Result<i32, ValidationError> {
    UNSIGNED_INTEGER_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<i32>().ok())
        .ok_or_else(|| ValidationError::InvalidEditionNumber(raw.trim().to_string()))
}
