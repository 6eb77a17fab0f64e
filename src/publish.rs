//! Draft → published: metadata defaults, canonical url, and the move into
//! the published directory.
//!
//! # Resolution order
//!
//! 1. `date` defaults to the processing time.
//! 2. `title` defaults to the first `# heading` when it is a single plain
//!    text run, otherwise to the file name.
//! 3. `url`: an explicit front-matter url wins (one leading `/` stripped);
//!    otherwise `{year}/{MM}/{slugify(slug or title)}`.
//! 4. `slug` and `name` are not part of the published front matter.

use crate::config::SiteConfig;
use crate::log;
use crate::record::{DraftRecord, FrontMatter, PublishedMeta, PublishedRecord};
use crate::utils::{date, file_name, slug::slugify};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Utc};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd, TextMergeStream};
use std::path::{Path, PathBuf};

/// Resolve a draft into a published record, using `now` for a missing date.
pub fn resolve(draft: DraftRecord, now: DateTime<Utc>) -> PublishedRecord {
    let DraftRecord {
        name,
        front,
        body,
    } = draft;

    let date = front.date.unwrap_or(now);
    let title = front
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| first_heading(&body))
        .unwrap_or_else(|| name.clone());
    let url = resolve_url(&front, &title, &date);

    let FrontMatter {
        tags,
        featured,
        overview,
        mut extra,
        ..
    } = front;
    extra.remove("name");

    PublishedRecord {
        name,
        meta: PublishedMeta {
            date,
            title,
            url,
            tags,
            featured,
            overview,
            extra,
        },
        body,
    }
}

/// Canonical url for a document. Never starts with `/`.
pub fn resolve_url(front: &FrontMatter, title: &str, date: &DateTime<Utc>) -> String {
    let explicit = front
        .url
        .as_deref()
        .map(|url| url.strip_prefix('/').unwrap_or(url))
        .filter(|url| !url.is_empty());
    if let Some(url) = explicit {
        return url.to_owned();
    }

    let source = front
        .slug
        .as_deref()
        .filter(|slug| !slug.trim().is_empty())
        .unwrap_or(title);
    format!(
        "{}/{}/{}",
        date.year(),
        date::month_string(date),
        slugify(source)
    )
}

/// Text of the first level-1 heading, if it is exactly one text run.
///
/// `# Hello World` gives `Some("Hello World")`; `# Hello *World*` gives `None`.
pub fn first_heading(markdown: &str) -> Option<String> {
    // The parser splits plain text at brackets and entities.
    let mut events = TextMergeStream::new(Parser::new(markdown));

    events.find(|ev| {
        matches!(
            ev,
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            })
        )
    })?;

    let mut children = Vec::new();
    for ev in events {
        match ev {
            Event::End(TagEnd::Heading(_)) => break,
            ev => children.push(ev),
        }
    }

    match children.as_slice() {
        [Event::Text(text)] => Some(text.trim().to_owned()).filter(|t| !t.is_empty()),
        _ => None,
    }
}

/// Output file stem: `name` when it already starts with `{year}-{MM}`,
/// otherwise `{year}-{MM}-{name}`.
pub fn published_stem(name: &str, date: &DateTime<Utc>) -> String {
    let prefix = date::year_month_prefix(date);
    if name.starts_with(&prefix) {
        name.to_owned()
    } else {
        format!("{prefix}-{name}")
    }
}

/// Destination of a published record inside `publish_dir`.
pub fn destination(publish_dir: &Path, record: &PublishedRecord) -> PathBuf {
    let stem = published_stem(&record.name, &record.meta.date);
    publish_dir.join(format!("{stem}.md"))
}

/// Publish one draft file: resolve it, write it to the published
/// directory and delete the draft. Returns the destination path.
pub async fn publish_file(src: &Path, config: &SiteConfig) -> Result<PathBuf> {
    if !tokio::fs::try_exists(src).await.unwrap_or(false) {
        bail!("not found: {}", src.display());
    }

    let text = tokio::fs::read_to_string(src)
        .await
        .with_context(|| format!("Failed to read draft: {}", src.display()))?;
    let name = src
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid draft file name: {}", src.display()))?;

    let draft = DraftRecord::parse(name, &text)
        .with_context(|| format!("Failed to parse draft: {}", src.display()))?;
    let record = resolve(draft, Utc::now());

    finalize(&record, src, &config.paths.published).await
}

/// Write the published record and remove its draft.
async fn finalize(record: &PublishedRecord, src: &Path, publish_dir: &Path) -> Result<PathBuf> {
    let dest = destination(publish_dir, record);
    let text = record
        .to_markdown()
        .with_context(|| format!("Failed to serialize front matter: {}", src.display()))?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(&dest, text)
        .await
        .with_context(|| format!("Failed to write: {}", dest.display()))?;
    log!("publish"; "{} => {}", file_name(src), dest.display());

    tokio::fs::remove_file(src)
        .await
        .with_context(|| format!("Failed to remove draft: {}", src.display()))?;

    Ok(dest)
}
