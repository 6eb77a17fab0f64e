//! Published markdown → JSON content records.
//!
//! # Flow
//!
//! ```text
//! build_file(src)
//!     │
//!     ├── parse front matter ──► url ──► dest = <content>/{url}.json
//!     │
//!     ├── should_build(force, src, dest)? ── no ──► Skipped
//!     │
//!     └── render + minify ──► BuiltRecord ──► write JSON ──► Written(dest)
//! ```

use crate::config::SiteConfig;
use crate::frontmatter;
use crate::record::{BuiltRecord, FrontMatter, RecordError};
use crate::render::render;
use crate::utils::file_name;
use crate::{log, vlog};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Result of building one published document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Record written to this path.
    Written(PathBuf),
    /// Destination is newer than the source.
    Skipped,
}

/// Decide whether `dest` needs to be (re)built from `src`.
///
/// Always true when forced or when `dest` is missing. Otherwise true iff
/// the source mtime is strictly newer. A failed stat counts as stale.
pub async fn should_build(force: bool, src: &Path, dest: &Path) -> bool {
    if force {
        return true;
    }
    if !tokio::fs::try_exists(dest).await.unwrap_or(false) {
        return true;
    }

    let (Ok(src_meta), Ok(dest_meta)) =
        (tokio::fs::metadata(src).await, tokio::fs::metadata(dest).await)
    else {
        return true;
    };
    let (Ok(src_time), Ok(dest_time)) = (src_meta.modified(), dest_meta.modified()) else {
        return true;
    };

    src_time > dest_time
}

/// Build a single published document into its JSON record.
pub async fn build_file(src: &Path, config: &SiteConfig, force: bool) -> Result<BuildOutcome> {
    if !tokio::fs::try_exists(src).await.unwrap_or(false) {
        bail!("not found: {}", src.display());
    }

    let text = tokio::fs::read_to_string(src)
        .await
        .with_context(|| format!("Failed to read: {}", src.display()))?;
    let (front, body) = frontmatter::parse::<FrontMatter>(&text)
        .with_context(|| format!("Failed to parse front matter: {}", src.display()))?;

    let url = front.url.as_deref().ok_or(RecordError::MissingField("url"))?;
    let dest = config.paths.record_path(url);

    if !should_build(force, src, &dest).await {
        vlog!("skip"; "{} is up to date", file_name(src));
        return Ok(BuildOutcome::Skipped);
    }

    let html = render(body, &config.render);
    let record = BuiltRecord::from_front_matter(front, html)?;
    let json = serde_json::to_string(&record)?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(&dest, json)
        .await
        .with_context(|| format!("Failed to write: {}", dest.display()))?;
    log!("build"; "{} => {}", file_name(src), dest.display());

    Ok(BuildOutcome::Written(dest))
}
