//! Vote categories

use serde::{Deserialize, Serialize};

/// The reserved category meaning "no usable outcome".
pub const ABSTAIN: &str = "abstain";

/// The category a `Reject` tie-break resolves to.
pub const REJECT: &str = "reject";

/// A categorical vote outcome (e.g. "approve", "reject", "abstain").
///
/// Categories are normalized to trimmed lower-case text so that workers
/// answering `"Approve"` and `"approve\n"` land in the same bucket.
///
/// # Example
///
/// ```
/// use tally_domain::Category;
///
/// let c = Category::normalize("  Approve\nbecause the plan is sound").unwrap();
/// assert_eq!(c.as_str(), "approve");
/// assert!(!c.is_abstain());
/// assert!(Category::normalize("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Build a category from already-clean text (lower-cased, trimmed).
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_lowercase())
    }

    /// The reserved abstain category
    pub fn abstain() -> Self {
        Self(ABSTAIN.to_string())
    }

    /// Normalize raw worker output into a category.
    ///
    /// Uses the first non-empty line, trimmed and lower-cased, with
    /// surrounding quotes and trailing punctuation stripped.
    /// Returns `None` for empty output.
    pub fn normalize(raw: &str) -> Option<Self> {
        let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
        let cleaned = line
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
            .trim_end_matches(['.', '!', ','])
            .trim()
            .to_lowercase();

        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_abstain(&self) -> bool {
        self.0 == ABSTAIN
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
