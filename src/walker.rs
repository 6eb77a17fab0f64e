//! Recursive directory walk with tracked per-file work.
//!
//! `walk` enumerates every entry under a root and hands each one to a
//! callback together with the walk's [`TaskTracker`]. Callbacks pick the
//! entries they care about and register async work with `tracker.add(..)`.
//! The walk returns only after enumeration ended and every registered task
//! settled, including tasks registered from the `on_end` hook.

use crate::tracker::TaskTracker;
use crate::vlog;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("not found: {0}")]
    RootNotFound(PathBuf),

    #[error("directory enumeration of `{0}` failed")]
    Enumeration(PathBuf, #[source] tokio::task::JoinError),
}

/// Walk `root`, calling `on_file` for every entry.
pub async fn walk<F>(root: &Path, on_file: F) -> Result<(), WalkError>
where
    F: FnMut(&DirEntry, &TaskTracker) + Send + 'static,
{
    walk_with_end(root, on_file, |_: &[DirEntry], _: &TaskTracker| {}).await
}

/// Walk `root`, calling `on_file` for every entry and `on_end` once with all
/// entries after enumeration finished.
pub async fn walk_with_end<F, E>(root: &Path, mut on_file: F, on_end: E) -> Result<(), WalkError>
where
    F: FnMut(&DirEntry, &TaskTracker) + Send + 'static,
    E: FnOnce(&[DirEntry], &TaskTracker) + Send + 'static,
{
    if !tokio::fs::try_exists(root).await.unwrap_or(false) {
        return Err(WalkError::RootNotFound(root.to_path_buf()));
    }

    let tracker = TaskTracker::new(1);
    let enumerator = tracker.clone();
    let dir = root.to_path_buf();

    // walkdir is blocking; tokio::spawn still works from this thread.
    tokio::task::spawn_blocking(move || {
        let mut entries = Vec::new();
        for result in WalkDir::new(&dir) {
            match result {
                Ok(entry) if is_ignored(&entry) => {}
                Ok(entry) => {
                    on_file(&entry, &enumerator);
                    entries.push(entry);
                }
                Err(err) => vlog!("walk"; "skipping entry: {}", err),
            }
        }
        on_end(&entries, &enumerator);
        enumerator.remove_ref();
    })
    .await
    .map_err(|err| WalkError::Enumeration(root.to_path_buf(), err))?;

    tracker.done().await;
    Ok(())
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_str().unwrap_or_default();
    IGNORED_FILES.contains(&name)
}

/// Whether `entry` is a regular file with the given extension (case-insensitive).
pub fn has_extension(entry: &DirEntry, ext: &str) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::{fs, sync::Arc, time::Duration};
    use tempfile::TempDir;
    use tokio::time::{sleep, timeout};

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[tokio::test]
    async fn test_missing_root_is_precondition_failure() {
        let result = walk(Path::new("/no/such/dir/anywhere"), |_, _| {}).await;
        assert!(matches!(result, Err(WalkError::RootNotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_directory_completes() {
        let dir = TempDir::new().unwrap();
        let result = timeout(Duration::from_secs(2), walk(dir.path(), |_, _| {})).await;
        assert!(result.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_no_matching_files_completes() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("notes.txt"));

        let walk = walk(dir.path(), |entry, tracker| {
            if has_extension(entry, "md") {
                tracker.add(async {});
            }
        });
        assert!(timeout(Duration::from_secs(2), walk).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_waits_for_every_registered_task() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.md"));
        touch(&dir.path().join("nested/b.MD"));
        touch(&dir.path().join("nested/deeper/c.md"));
        touch(&dir.path().join("nested/skip.txt"));
        touch(&dir.path().join(".DS_Store"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        walk(dir.path(), move |entry, tracker| {
            if has_extension(entry, "md") {
                let sink = sink.clone();
                let name = entry.file_name().to_string_lossy().into_owned();
                tracker.add(async move {
                    sleep(Duration::from_millis(20)).await;
                    sink.lock().push(name);
                });
            }
        })
        .await
        .unwrap();

        let mut seen = seen.lock().clone();
        seen.sort();
        assert_eq!(seen, vec!["a.md", "b.MD", "c.md"]);
    }

    #[tokio::test]
    async fn test_on_end_sees_all_entries_and_can_add_work() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("one.md"));
        touch(&dir.path().join("sub/two.md"));

        let finished = Arc::new(Mutex::new(None));
        let sink = finished.clone();
        walk_with_end(
            dir.path(),
            |_, _| {},
            move |entries, tracker| {
                let files = entries.iter().filter(|e| e.file_type().is_file()).count();
                tracker.add(async move {
                    sleep(Duration::from_millis(20)).await;
                    *sink.lock() = Some(files);
                });
            },
        )
        .await
        .unwrap();

        assert_eq!(*finished.lock(), Some(2));
    }

    #[tokio::test]
    async fn test_ignores_ds_store() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join(".DS_Store"));

        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        walk(dir.path(), move |entry, _| {
            if entry.file_type().is_file() {
                *sink.lock() += 1;
            }
        })
        .await
        .unwrap();
        assert_eq!(*count.lock(), 0);
    }
}
