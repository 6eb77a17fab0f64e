//! Derived index views over the built corpus.
//!
//! Every reducer is a pure function of the full record set and produces one
//! [`IndexDescriptor`], written as `<indexes>/<name>.json`.
//!
//! | Index      | Content          | Shape                                   |
//! |------------|------------------|-----------------------------------------|
//! | `all`      | stripped         | every record, newest first              |
//! | `recent`   | stripped         | 5 newest                                |
//! | `featured` | stripped         | 5 newest with `featured: true`          |
//! | `archives` | stripped         | `[["YYYY", [records…]], …]`, newest first |
//! | `overview` | summary window   | 100 newest with `overview` not false    |
//! | `tagList`  | -                | distinct tags, first-seen order         |

use crate::config::{IndexKind, SiteConfig};
use crate::log;
use crate::record::BuiltRecord;
use crate::report::StageReport;
use crate::tracker::TaskTracker;
use crate::walker::{WalkError, has_extension, walk};
use anyhow::{Context, Result};
use chrono::Datelike;
use parking_lot::Mutex;
use rayon::prelude::*;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde_json::Value;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

const RECENT_LIMIT: usize = 5;
const OVERVIEW_LIMIT: usize = 100;

/// Content longer than this many characters is cut to a summary window.
const SUMMARY_THRESHOLD: usize = 1000;
const FENCE: &str = "```";
const ELLIPSIS: &str = " ...";

static SUMMARY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--summary-(start|end)-->").unwrap());

/// A named index ready to be serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescriptor {
    pub name: &'static str,
    pub data: Value,
}

// ============================================================================
// Reducers
// ============================================================================

/// Run one reducer over the corpus.
pub fn reduce(kind: IndexKind, records: &[BuiltRecord]) -> Result<IndexDescriptor, serde_json::Error> {
    let data = match kind {
        IndexKind::All => serde_json::to_value(all(records)),
        IndexKind::Recent => serde_json::to_value(recent(records)),
        IndexKind::Featured => serde_json::to_value(featured(records)),
        IndexKind::Archives => serde_json::to_value(archives(records)),
        IndexKind::Overview => serde_json::to_value(overview(records)),
        IndexKind::TagList => serde_json::to_value(tag_list(records)),
    }?;

    Ok(IndexDescriptor {
        name: kind.name(),
        data,
    })
}

/// Run every enabled reducer in parallel over the same snapshot.
pub fn reduce_all(
    kinds: &[IndexKind],
    records: &[BuiltRecord],
) -> Vec<(IndexKind, Result<IndexDescriptor, serde_json::Error>)> {
    kinds
        .par_iter()
        .map(|&kind| (kind, reduce(kind, records)))
        .collect()
}

/// Stripped records, stable-sorted by date ascending, then reversed.
fn newest_first<'a>(records: impl Iterator<Item = &'a BuiltRecord>) -> Vec<BuiltRecord> {
    let mut sorted: Vec<_> = records.map(BuiltRecord::without_content).collect();
    sorted.sort_by_key(|r| r.date);
    sorted.reverse();
    sorted
}

pub fn all(records: &[BuiltRecord]) -> Vec<BuiltRecord> {
    newest_first(records.iter())
}

pub fn recent(records: &[BuiltRecord]) -> Vec<BuiltRecord> {
    let mut records = newest_first(records.iter());
    records.truncate(RECENT_LIMIT);
    records
}

pub fn featured(records: &[BuiltRecord]) -> Vec<BuiltRecord> {
    let mut records = newest_first(records.iter().filter(|r| r.featured));
    records.truncate(RECENT_LIMIT);
    records
}

/// Records grouped by calendar year, keyed by the year as a string.
///
/// Years and the records inside each year are both newest first.
pub fn archives(records: &[BuiltRecord]) -> Vec<(String, Vec<BuiltRecord>)> {
    let mut years: Vec<(String, Vec<BuiltRecord>)> = Vec::new();
    for record in newest_first(records.iter()) {
        let year = record.date.year().to_string();
        match years.last_mut() {
            Some((last, group)) if *last == year => group.push(record),
            _ => years.push((year, vec![record])),
        }
    }
    years
}

/// The 100 newest records shown on the overview, long content cut to a summary.
pub fn overview(records: &[BuiltRecord]) -> Vec<BuiltRecord> {
    let mut shown: Vec<_> = records.iter().filter(|r| r.overview).cloned().collect();
    shown.sort_by_key(|r| r.date);
    shown.reverse();
    shown.truncate(OVERVIEW_LIMIT);

    for record in &mut shown {
        if record.content_len() > SUMMARY_THRESHOLD
            && let Some(content) = &record.content
        {
            record.content = Some(summarize(content));
        }
    }
    shown
}

pub fn tag_list(records: &[BuiltRecord]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    records
        .iter()
        .flat_map(|r| &r.tags)
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

/// Cut `content` to its summary window.
///
/// The window defaults to the first 1000 characters. A `summary-end` marker
/// ends it early; a `summary-start` marker seen before that moves its start
/// to just past the marker. Unbalanced code fences are cut off, trailing
/// whitespace trimmed and `" ..."` appended.
pub fn summarize(content: &str) -> String {
    let mut start = 0;
    let mut end = content
        .char_indices()
        .nth(SUMMARY_THRESHOLD)
        .map_or(content.len(), |(i, _)| i);

    for caps in SUMMARY_MARKER.captures_iter(content) {
        let (Some(marker), Some(kind)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if kind.as_str() == "end" {
            end = marker.start();
            break;
        }
        start = marker.end();
    }

    let window = content.get(start..end).unwrap_or_default();
    format!("{}{ELLIPSIS}", balance_fences(window).trim_end())
}

/// Drop everything from the last fence while an odd number of fences remain.
fn balance_fences(mut text: &str) -> &str {
    while text.matches(FENCE).count() % 2 == 1 {
        match text.rfind(FENCE) {
            Some(i) => text = &text[..i],
            None => break,
        }
    }
    text
}

// ============================================================================
// Corpus I/O
// ============================================================================

/// Load every built record under the content directory, skipping the
/// index subtree. Unreadable records are reported and left out.
pub async fn load_records(
    config: &'static SiteConfig,
    report: Arc<StageReport>,
) -> Result<Vec<BuiltRecord>, WalkError> {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = records.clone();

    walk(&config.paths.content, move |entry, tracker| {
        if !has_extension(entry, "json") || config.paths.is_index_path(entry.path()) {
            return;
        }
        let path = entry.path().to_path_buf();
        let sink = sink.clone();
        let report = report.clone();
        tracker.add(async move {
            match read_record(&path).await {
                Ok(record) => sink.lock().push(record),
                Err(err) => report.fail(&path, &err),
            }
        });
    })
    .await?;

    let mut records = std::mem::take(&mut *records.lock());
    // walk order is arbitrary; fix it so equal dates sort the same every run
    records.sort_by(|a, b| a.url.cmp(&b.url));
    Ok(records)
}

async fn read_record(path: &Path) -> Result<BuiltRecord> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid record: {}", path.display()))
}

/// Path of an index file inside `dir`.
pub fn index_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// Write each descriptor independently; a failed write is reported without
/// stopping the others.
pub async fn write_indexes(
    dir: &Path,
    descriptors: Vec<IndexDescriptor>,
    report: Arc<StageReport>,
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let tracker = TaskTracker::new(1);
    for descriptor in descriptors {
        let path = index_path(dir, descriptor.name);
        let report = report.clone();
        tracker.add(async move {
            match write_descriptor(&path, &descriptor).await {
                Ok(()) => {
                    report.processed();
                    log!("index"; "{}", path.display());
                }
                Err(err) => report.fail(&path, &err),
            }
        });
    }
    tracker.remove_ref();
    tracker.done().await;

    Ok(())
}

async fn write_descriptor(path: &Path, descriptor: &IndexDescriptor) -> Result<()> {
    let json = serde_json::to_string(&descriptor.data)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write: {}", path.display()))
}
