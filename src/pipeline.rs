//! Stage orchestration.
//!
//! # Stages
//!
//! ```text
//! run
//!  ├── publish_all ── walk(drafts)    ── publish_file  per .md ──┐ barrier
//!  ├── build_all   ── walk(published) ── build_file    per .md ──┐ barrier
//!  └── build_indexes ── load_records ── reduce_all ── write_indexes
//! ```
//!
//! Per-file work is spawned on the walk's tracker and reports into a
//! [`StageReport`]; a failing file never stops its siblings. Only missing
//! stage inputs abort a stage.

use crate::build::{BuildOutcome, build_file};
use crate::config::SiteConfig;
use crate::indexes::{self, index_path};
use crate::publish::publish_file;
use crate::report::{Counts, StageReport};
use crate::walker::{has_extension, walk};
use crate::{log, vlog};
use anyhow::{Context, Result, anyhow};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

// ============================================================================
// Publish
// ============================================================================

/// Publish every draft in the drafts directory.
pub async fn publish_all(config: &'static SiteConfig) -> Result<Counts> {
    log!("publish"; "publishing all drafts in {}", config.paths.drafts.display());
    let report = Arc::new(StageReport::new());
    let sink = report.clone();

    walk(&config.paths.drafts, move |entry, tracker| {
        if !has_extension(entry, "md") {
            return;
        }
        let path = entry.path().to_path_buf();
        let report = sink.clone();
        tracker.add(async move {
            match publish_file(&path, config).await {
                Ok(_) => report.processed(),
                Err(err) => report.fail(&path, &err),
            }
        });
    })
    .await?;

    let counts = report.counts();
    log!("publish"; "{}", counts.summary("published"));
    Ok(counts)
}

/// Publish the named drafts. Each name is looked up relative to the current
/// directory first, then to the drafts directory. Unknown names are reported
/// and the rest still get published.
pub async fn publish_files(config: &'static SiteConfig, names: &[PathBuf]) -> Result<Counts> {
    let report = StageReport::new();

    for name in names {
        let Some(src) = locate(name, &config.paths.drafts).await else {
            report.fail(name, &anyhow!("not found"));
            continue;
        };
        vlog!("publish"; "processing {}", name.display());
        match publish_file(&src, config).await {
            Ok(_) => report.processed(),
            Err(err) => report.fail(&src, &err),
        }
    }

    Ok(report.counts())
}

// ============================================================================
// Build
// ============================================================================

/// Build every published document, skipping up-to-date records unless forced.
pub async fn build_all(config: &'static SiteConfig, force: bool) -> Result<Counts> {
    log!("build"; "building all published content in {}", config.paths.published.display());
    let report = Arc::new(StageReport::new());
    let sink = report.clone();

    walk(&config.paths.published, move |entry, tracker| {
        if !has_extension(entry, "md") {
            return;
        }
        let path = entry.path().to_path_buf();
        let report = sink.clone();
        tracker.add(async move {
            let result = build_file(&path, config, force).await;
            record_build(&report, &path, result);
        });
    })
    .await?;

    let counts = report.counts();
    log!("build"; "{}", counts.summary("built"));
    Ok(counts)
}

/// Build the given published files, looked up like [`publish_files`] but
/// against the published directory.
pub async fn build_files(config: &'static SiteConfig, names: &[PathBuf], force: bool) -> Result<Counts> {
    let report = StageReport::new();

    for name in names {
        let Some(src) = locate(name, &config.paths.published).await else {
            report.fail(name, &anyhow!("not found"));
            continue;
        };
        vlog!("build"; "building {}", name.display());
        record_build(&report, &src, build_file(&src, config, force).await);
    }

    Ok(report.counts())
}

fn record_build(report: &StageReport, path: &Path, result: Result<BuildOutcome>) {
    match result {
        Ok(BuildOutcome::Written(_)) => report.processed(),
        Ok(BuildOutcome::Skipped) => report.skipped(),
        Err(err) => report.fail(path, &err),
    }
}

// ============================================================================
// Indexes
// ============================================================================

/// Rebuild every enabled index from the built corpus.
pub async fn build_indexes(config: &'static SiteConfig) -> Result<Counts> {
    log!("index"; "building indexes..");
    let report = Arc::new(StageReport::new());
    let dir = config.paths.indexes_dir();

    tokio::fs::create_dir_all(&config.paths.content)
        .await
        .with_context(|| {
            format!("Failed to create content directory: {}", config.paths.content.display())
        })?;
    let records = indexes::load_records(config, report.clone()).await?;
    vlog!("index"; "{} records loaded", records.len());

    let kinds = config.index.enable.clone();
    let reduced =
        tokio::task::spawn_blocking(move || indexes::reduce_all(&kinds, &records)).await?;

    let mut descriptors = Vec::with_capacity(reduced.len());
    for (kind, result) in reduced {
        match result {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(err) => report.fail(&index_path(&dir, kind.name()), &anyhow::Error::from(err)),
        }
    }
    indexes::write_indexes(&dir, descriptors, report.clone()).await?;

    let counts = report.counts();
    log!("index"; "{}", counts.summary("written"));
    Ok(counts)
}

// ============================================================================
// Commands
// ============================================================================

/// `publish [files...]`
pub async fn run_publish(config: &'static SiteConfig, files: &[PathBuf]) -> Result<()> {
    log!("start"; "publish");
    if files.is_empty() {
        publish_all(config).await?;
    } else {
        publish_files(config, files).await?;
    }
    log!("done"; "publish");
    Ok(())
}

/// `build [-f] [files...]`: build, then rebuild the indexes.
pub async fn run_build(config: &'static SiteConfig, files: &[PathBuf], force: bool) -> Result<()> {
    log!("start"; "build");
    if files.is_empty() {
        build_all(config, force).await?;
    } else {
        build_files(config, files, force).await?;
    }
    build_indexes(config).await?;
    log!("done"; "build");
    Ok(())
}

/// `run [-f]`: publish all, build all, rebuild the indexes.
pub async fn run_all(config: &'static SiteConfig, force: bool) -> Result<()> {
    log!("start"; "publish and build");
    publish_all(config).await?;
    build_all(config, force).await?;
    build_indexes(config).await?;
    log!("done"; "publish and build");
    Ok(())
}

/// Resolve a user-supplied file name: as given (relative to the current
/// directory), else inside `dir`.
async fn locate(name: &Path, dir: &Path) -> Option<PathBuf> {
    for candidate in [name.to_path_buf(), dir.join(name)] {
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date;
    use chrono::{Datelike, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, &'static SiteConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let config = Box::leak(Box::new(SiteConfig::with_root(&root)));
        (dir, config)
    }

    fn draft(config: &SiteConfig, name: &str, text: &str) -> PathBuf {
        let path = config.paths.drafts.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_all_end_to_end() {
        let (_dir, config) = site();
        let src = draft(config, "my-post.md", "---\ntitle: Hello World\n---\nSome *body* text.\n");
        draft(
            config,
            "old.md",
            "---\ntitle: Old Post\ndate: 2020-06-01\ntags: [rust, web]\nfeatured: true\n---\nOld.\n",
        );

        run_all(config, false).await.unwrap();

        let now = Utc::now();
        let month = date::month_string(&now);
        let record_path = config
            .paths
            .content
            .join(format!("{}/{month}/hello-world.json", now.year()));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&record_path).unwrap()).unwrap();

        assert_eq!(json["title"], "Hello World");
        assert_eq!(json["url"], format!("{}/{month}/hello-world", now.year()));
        assert!(json["content"].as_str().unwrap().contains("<em>body</em>"));
        assert!(json.get("name").is_none());
        assert!(json.get("slug").is_none());

        // drafts are consumed
        assert!(!src.exists());
        let published = config
            .paths
            .published
            .join(format!("{}-my-post.md", date::year_month_prefix(&now)));
        assert!(published.exists());

        let indexes = config.paths.indexes_dir();
        let all: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(indexes.join("all.json")).unwrap()).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 2);
        assert_eq!(all[0]["title"], "Hello World");
        assert!(all[0].get("content").is_none());

        let featured: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(indexes.join("featured.json")).unwrap()).unwrap();
        assert_eq!(featured[0]["url"], "2020/06/old-post");

        let tags = fs::read_to_string(indexes.join("tagList.json")).unwrap();
        assert_eq!(tags, r#"["rust","web"]"#);
    }

    #[tokio::test]
    async fn test_rebuild_skips_up_to_date_records() {
        let (_dir, config) = site();
        draft(config, "a.md", "---\ntitle: A\ndate: 2021-01-01\n---\nA\n");
        publish_all(config).await.unwrap();

        let first = build_all(config, false).await.unwrap();
        assert_eq!((first.processed, first.skipped), (1, 0));

        let second = build_all(config, false).await.unwrap();
        assert_eq!((second.processed, second.skipped), (0, 1));

        let forced = build_all(config, true).await.unwrap();
        assert_eq!((forced.processed, forced.skipped), (1, 0));
    }

    #[tokio::test]
    async fn test_bad_file_does_not_stop_siblings() {
        let (_dir, config) = site();
        fs::create_dir_all(&config.paths.published).unwrap();
        fs::write(
            config.paths.published.join("good.md"),
            "---\ntitle: Good\ndate: 2021-01-01\nurl: good\n---\nok\n",
        )
        .unwrap();
        fs::write(config.paths.published.join("bad.md"), "---\ntitle: [unclosed\n---\n").unwrap();

        let counts = build_all(config, false).await.unwrap();

        assert_eq!(counts.processed, 1);
        assert_eq!(counts.failed.len(), 1);
        assert!(counts.failed[0].0.ends_with("bad.md"));
        assert!(config.paths.record_path("good").exists());
    }

    #[tokio::test]
    async fn test_publish_files_reports_unknown_names() {
        let (_dir, config) = site();
        draft(config, "known.md", "---\ntitle: Known\ndate: 2022-02-02\n---\n");

        let counts = publish_files(config, &[PathBuf::from("missing.md"), PathBuf::from("known.md")])
            .await
            .unwrap();

        assert_eq!(counts.processed, 1);
        assert_eq!(counts.failed, vec![(PathBuf::from("missing.md"), "not found".to_string())]);
        assert!(config.paths.published.join("2022-02-known.md").exists());
    }

    #[tokio::test]
    async fn test_missing_drafts_dir_is_fatal() {
        let (_dir, config) = site();
        let err = publish_all(config).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_build_files_single() {
        let (_dir, config) = site();
        fs::create_dir_all(&config.paths.published).unwrap();
        let src = config.paths.published.join("one.md");
        fs::write(&src, "---\ntitle: One\ndate: 2021-01-01\nurl: x/one\n---\n").unwrap();

        let counts = build_files(config, &[src], false).await.unwrap();
        assert_eq!(counts.processed, 1);
        assert!(config.paths.record_path("x/one").exists());
    }

    #[tokio::test]
    async fn test_only_enabled_indexes_are_written() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::with_root(&dir.path().canonicalize().unwrap());
        config.index.enable = vec![crate::config::IndexKind::Recent];
        let config: &'static SiteConfig = Box::leak(Box::new(config));
        fs::create_dir_all(&config.paths.content).unwrap();

        let counts = build_indexes(config).await.unwrap();

        assert_eq!(counts.processed, 1);
        let indexes = config.paths.indexes_dir();
        assert_eq!(fs::read_to_string(indexes.join("recent.json")).unwrap(), "[]");
        assert!(!indexes.join("all.json").exists());
    }

    #[tokio::test]
    async fn test_indexes_for_a_site_never_built() {
        let (_dir, config) = site();
        assert!(!config.paths.content.exists());

        let counts = build_indexes(config).await.unwrap();

        assert!(counts.failed.is_empty());
        let indexes = config.paths.indexes_dir();
        assert_eq!(fs::read_to_string(indexes.join("all.json")).unwrap(), "[]");
        assert_eq!(fs::read_to_string(indexes.join("tagList.json")).unwrap(), "[]");
    }
}
