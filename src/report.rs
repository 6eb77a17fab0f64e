//! Per-stage outcome collection.
//!
//! Per-file tasks run detached on the walk's tracker, so their results are
//! recorded here instead of being returned. The orchestrator reads the
//! report after the stage barrier.

use crate::log;
use crate::utils::file_name;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct StageReport {
    inner: Mutex<Counts>,
}

/// Snapshot of a finished stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl StageReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) {
        self.inner.lock().processed += 1;
    }

    pub fn skipped(&self) {
        self.inner.lock().skipped += 1;
    }

    /// Record a per-file failure and print it on the error channel.
    pub fn fail(&self, path: &Path, err: &anyhow::Error) {
        log!("error"; "{}: {:#}", file_name(path), err);
        self.inner
            .lock()
            .failed
            .push((path.to_path_buf(), format!("{err:#}")));
    }

    pub fn counts(&self) -> Counts {
        self.inner.lock().clone()
    }
}

impl Counts {
    /// One-line summary, e.g. `3 built, 1 skipped, 0 failed`.
    pub fn summary(&self, verb: &str) -> String {
        format!(
            "{} {verb}, {} skipped, {} failed",
            self.processed,
            self.skipped,
            self.failed.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Arc;

    #[test]
    fn test_report_counts() {
        let report = StageReport::new();
        report.processed();
        report.processed();
        report.skipped();
        report.fail(Path::new("/x/bad.md"), &anyhow!("boom").context("Failed to read"));

        let counts = report.counts();
        assert_eq!(counts.processed, 2);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed.len(), 1);
        assert_eq!(counts.failed[0].0, PathBuf::from("/x/bad.md"));
        assert_eq!(counts.failed[0].1, "Failed to read: boom");
        assert_eq!(counts.summary("built"), "2 built, 1 skipped, 1 failed");
    }

    #[test]
    fn test_report_shared_across_threads() {
        let report = Arc::new(StageReport::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let report = report.clone();
                std::thread::spawn(move || report.processed())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(report.counts().processed, 8);
        assert!(report.counts().failed.is_empty());
    }
}
