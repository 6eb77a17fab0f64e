//! `[index]` section configuration.

use super::defaults;
use educe::Educe;
use serde::Deserialize;
use std::fmt;

/// A derived index written to `<indexes>/<name>.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum IndexKind {
    #[serde(rename = "overview")]
    Overview,
    #[serde(rename = "all")]
    All,
    #[serde(rename = "recent")]
    Recent,
    #[serde(rename = "featured")]
    Featured,
    #[serde(rename = "archives")]
    Archives,
    #[serde(rename = "tagList")]
    TagList,
}

impl IndexKind {
    pub const ALL: [IndexKind; 6] = [
        Self::Overview,
        Self::All,
        Self::Recent,
        Self::Featured,
        Self::Archives,
        Self::TagList,
    ];

    /// File stem of the index output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::All => "all",
            Self::Recent => "recent",
            Self::Featured => "featured",
            Self::Archives => "archives",
            Self::TagList => "tagList",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `[index]` section in folio.toml.
///
/// # Example
/// ```toml
/// [index]
/// enable = ["archives", "recent", "featured"]
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Indexes to build after every build stage.
    #[serde(default = "defaults::index::enable")]
    #[educe(Default = defaults::index::enable())]
    pub enable: Vec<IndexKind>,
}
