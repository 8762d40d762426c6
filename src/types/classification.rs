use std::fmt;

use serde::{Deserialize, Serialize};

/// A checksum's classification.
///
/// `Ord` is alphabetical by name, which is also the order categories are
/// written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bad,
    Good,
    Unknown,
}

impl Category {
    /// Serialization order.
    pub const ALL: [Category; 3] = [Category::Bad, Category::Good, Category::Unknown];

    /// Lookup order used by `classify` and the load-time conflict check.
    pub const SEARCH_ORDER: [Category; 3] = [Category::Good, Category::Bad, Category::Unknown];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Bad => "bad",
            Category::Good => "good",
            Category::Unknown => "unknown",
        }
    }

    /// Name of this category's list in the legacy text format.
    pub fn list_name(self) -> &'static str {
        match self {
            Category::Bad => "bad_md5",
            Category::Good => "good_md5",
            Category::Unknown => "unknown_md5",
        }
    }

    pub fn from_list_name(name: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.list_name() == name)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// True iff the checksum was novel and has just been added to `unknown`.
    pub mutated: bool,
}

/// Status reported for one artifact check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Bad,
    Fail,
    Good,
    Unknown,
}

impl CheckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Bad => "bad",
            CheckStatus::Fail => "fail",
            CheckStatus::Good => "good",
            CheckStatus::Unknown => "unknown",
        }
    }
}

impl From<Category> for CheckStatus {
    fn from(category: Category) -> Self {
        match category {
            Category::Bad => CheckStatus::Bad,
            Category::Good => CheckStatus::Good,
            Category::Unknown => CheckStatus::Unknown,
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller gets back for one artifact: a status plus a line to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
}
