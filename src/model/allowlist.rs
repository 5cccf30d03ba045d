use serde::{Deserialize, Serialize};

/// A reviewed exception for one advisory on one package.
///
/// Entries are only ever built by [`crate::allowlist::parse_allowlist`], which
/// guarantees the required fields are non-empty and `expires` parses as a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowlistEntry {
    pub id: String,
    pub package: String,
    pub reason: String,
    pub expires: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_on: Option<String>,
}

impl AllowlistEntry {
    pub fn new(
        id: impl Into<String>,
        package: impl Into<String>,
        reason: impl Into<String>,
        expires: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            package: package.into(),
            reason: reason.into(),
            expires: expires.into(),
            notes: None,
            reviewed_on: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Exact match on advisory id and package name.
    pub fn matches(&self, id: &str, package: &str) -> bool {
        self.id == id && self.package == package
    }
}
