//! `[paths]` section configuration.
//!
//! # Layout
//!
//! ```text
//! root/
//!   content/drafts/       ← drafts      (publish input)
//!   content/published/    ← published   (publish output, build input)
//!   public/content/       ← content     (build output, index input)
//!   public/content/indexes/ ← indexes   (index output)
//! ```

use super::defaults;
use educe::Educe;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// `[paths]` section in folio.toml - where each stage reads and writes.
///
/// # Example
/// ```toml
/// [paths]
/// drafts = "content/drafts"
/// published = "content/published"
/// content = "public/content"
/// indexes = "public/content/indexes"
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::paths::root")]
    #[educe(Default = defaults::paths::root())]
    pub root: Option<PathBuf>,

    /// Unpublished drafts.
    #[serde(default = "defaults::paths::drafts")]
    #[educe(Default = defaults::paths::drafts())]
    pub drafts: PathBuf,

    /// Normalized markdown, one file per published document.
    #[serde(default = "defaults::paths::published")]
    #[educe(Default = defaults::paths::published())]
    pub published: PathBuf,

    /// Built JSON content records.
    #[serde(default = "defaults::paths::content")]
    #[educe(Default = defaults::paths::content())]
    pub content: PathBuf,

    /// Derived index files. Defaults to `<content>/indexes`.
    #[serde(default = "defaults::paths::indexes")]
    #[educe(Default = defaults::paths::indexes())]
    pub indexes: Option<PathBuf>,
}

impl PathsConfig {
    /// Index output directory, falling back to `<content>/indexes`.
    pub fn indexes_dir(&self) -> PathBuf {
        self.indexes
            .clone()
            .unwrap_or_else(|| self.content.join("indexes"))
    }

    /// Build output path for a record url: `<content>/{url}.json`.
    ///
    /// Only plain segments of `url` are kept, so roots and `..` never
    /// leave `content`.
    pub fn record_path(&self, url: &str) -> PathBuf {
        let rel: PathBuf = Path::new(url)
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        let mut file = rel.into_os_string();
        file.push(".json");
        self.content.join(file)
    }

    /// Check whether a path lies inside the index output directory.
    pub fn is_index_path(&self, path: &Path) -> bool {
        path.starts_with(self.indexes_dir())
    }
}
