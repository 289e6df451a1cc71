//! Author domain record.

use serde::{Deserialize, Serialize};

/// Store-assigned author identifier. Valid ids are strictly positive.
pub type AuthorId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    /// `"First Last"`, as shown in author listings.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Returns whether `id` could name a stored author.
pub fn is_valid_author_id(id: AuthorId) -> bool {
    id > 0
}
