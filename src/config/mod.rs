//! Site configuration management for `folio.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `[paths]`   | Drafts, published, content and index dirs       |
//! | `[render]`  | Markdown extensions and minification            |
//! | `[index]`   | Which derived indexes are written               |
//!
//! # Example
//!
//! ```toml
//! [paths]
//! drafts = "content/drafts"
//! content = "public/content"
//!
//! [render]
//! minify = true
//!
//! [index]
//! enable = ["archives", "recent", "featured"]
//! ```
//!
//! The loaded config is never mutated after `update_with_cli`; `main` leaks
//! it to `&'static` and every stage borrows it.

pub mod defaults;
mod error;
mod index;
mod paths;
mod render;

pub use error::ConfigError;
pub use index::{IndexConfig, IndexKind};
pub use paths::PathsConfig;
pub use render::RenderConfig;

use crate::cli::Cli;
use anyhow::{Result, bail};
use educe::Educe;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Stage directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// Markdown rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Derived index settings
    #[serde(default)]
    pub index: IndexConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Default configuration with every directory resolved under `root`.
    #[cfg(test)]
    pub fn with_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.resolve_paths(root);
        config
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.paths.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        // Apply CLI overrides first
        Self::update_option(&mut self.paths.drafts, cli.drafts_dir.as_ref());
        Self::update_option(&mut self.paths.published, cli.publish_dir.as_ref());
        Self::update_option(&mut self.paths.content, cli.content_dir.as_ref());
        if let Some(indexes) = &cli.indexes_dir {
            self.paths.indexes = Some(indexes.clone());
        }

        self.resolve_paths(&root);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve all directories against `root` and normalize to absolute paths.
    ///
    /// The index directory is resolved after `content` so the
    /// `<content>/indexes` fallback follows a relocated content dir.
    fn resolve_paths(&mut self, root: &Path) {
        let root = Self::normalize_path(&Self::expand_tilde(root));
        self.paths.root = Some(root.clone());

        self.paths.drafts = Self::resolve(&root, &self.paths.drafts);
        self.paths.published = Self::resolve(&root, &self.paths.published);
        self.paths.content = Self::resolve(&root, &self.paths.content);
        self.paths.indexes = Some(match self.paths.indexes.take() {
            Some(indexes) => Self::resolve(&root, &indexes),
            None => self.paths.content.join("indexes"),
        });
    }

    fn resolve(root: &Path, path: &Path) -> PathBuf {
        let path = Self::expand_tilde(path);
        if path.is_relative() {
            Self::normalize_path(&root.join(path))
        } else {
            Self::normalize_path(&path)
        }
    }

    /// Expand a leading `~` to the home directory
    fn expand_tilde(path: &Path) -> PathBuf {
        match path.to_str() {
            Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
            None => path.to_path_buf(),
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let enabled = &self.index.enable;
        if enabled.is_empty() {
            bail!(ConfigError::invalid(
                "index",
                "`enable` must name at least one index"
            ));
        }

        for (i, kind) in enabled.iter().enumerate() {
            if enabled[..i].contains(kind) {
                bail!(ConfigError::invalid(
                    "index",
                    format!("`{kind}` is enabled more than once")
                ));
            }
        }

        let content = &self.paths.content;
        if self.paths.drafts == *content || self.paths.published == *content {
            bail!(ConfigError::invalid(
                "paths",
                "`content` must differ from `drafts` and `published`"
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
