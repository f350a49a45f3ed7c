//! Categories and keywords.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A crate category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The category ID (same as the slug).
    pub id: String,

    /// Display name, e.g. "Command line utilities".
    pub category: String,

    pub slug: String,

    #[serde(default)]
    pub description: String,

    /// Number of crates in this category, computed when served.
    #[serde(default)]
    pub crates_cnt: u64,

    pub created_at: DateTime<Utc>,
}

/// A crate keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// The keyword ID (same as the keyword).
    pub id: String,

    pub keyword: String,

    /// Number of crates using this keyword, computed when served.
    #[serde(default)]
    pub crates_cnt: u64,

    pub created_at: DateTime<Utc>,
}
