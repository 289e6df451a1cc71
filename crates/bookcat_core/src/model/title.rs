//! Title domain record.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    /// Caller-assigned unique key.
    pub isbn: String,
    pub name: String,
    pub edition_number: i32,
    /// Kept as text, e.g. `"2020"`.
    pub copyright_year: String,
}

impl Title {
    pub fn new(
        isbn: impl Into<String>,
        name: impl Into<String>,
        edition_number: i32,
        copyright_year: impl Into<String>,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            name: name.into(),
            edition_number,
            copyright_year: copyright_year.into(),
        }
    }
}

/// Mutable title fields applied by a read-modify-write update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleChanges {
    pub name: String,
    pub edition_number: i32,
    pub copyright_year: String,
}

impl TitleChanges {
    /// Overwrites the mutable fields of `title`; `isbn` is never touched.
    pub fn apply_to(&self, title: &mut Title) {
        title.name.clone_from(&self.name);
        title.edition_number = self.edition_number;
        title.copyright_year.clone_from(&self.copyright_year);
    }
}
