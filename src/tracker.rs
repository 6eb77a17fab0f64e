//! Completion counting for an open-ended set of background tasks.
//!
//! A directory walk discovers files while earlier files are already being
//! processed, so the number of tasks is unknown until enumeration ends. The
//! tracker is seeded with one ref for "enumeration in progress"; each
//! discovered task adds a ref and releases it when it finishes, and the
//! enumerator releases the seed ref last. `done()` resolves when the count
//! reaches zero.
//!
//! ```text
//!  seed ─┐  add(a) ─┐  add(b) ─┐   a done   enum end   b done
//!    1   │    2     │    3     │      2         1          0 ──► done
//! ```
//!
//! The tracker counts completion, not success: a task's output (including an
//! `Err`) is dropped, and a panicking task still releases its ref. Callers
//! that care about failures record them before the task returns.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::watch;

/// Cloneable handle to a shared completion counter.
#[derive(Debug, Clone)]
pub struct TaskTracker {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    count: AtomicUsize,
    done: watch::Sender<bool>,
}

impl TaskTracker {
    /// Create a tracker holding `start` refs. A tracker created with 0 refs
    /// is never done; use 1 and release it when enumeration ends.
    pub fn new(start: usize) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                count: AtomicUsize::new(start),
                done,
            }),
        }
    }

    pub fn add_ref(&self) {
        self.inner.count.fetch_add(1, Ordering::AcqRel);
    }

    /// Release one ref, firing the completion signal when the last one goes.
    pub fn remove_ref(&self) {
        if self.inner.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.done.send_replace(true);
        }
    }

    /// Spawn `task` on the tokio runtime and hold a ref until it settles.
    pub fn add<F>(&self, task: F)
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.add_ref();
        let guard = RefGuard(self.clone());
        tokio::spawn(async move {
            let _guard = guard;
            let _ = task.await;
        });
    }

    /// Number of refs currently held.
    #[cfg(test)]
    pub fn current(&self) -> usize {
        self.inner.count.load(Ordering::Acquire)
    }

    /// Wait for the count to reach zero. Returns immediately once it has.
    pub async fn done(&self) {
        let mut rx = self.inner.done.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = rx.wait_for(|done| *done).await;
    }

    #[cfg(test)]
    pub fn is_done(&self) -> bool {
        *self.inner.done.borrow()
    }
}

/// Releases a ref on drop, so unwinding tasks still count as settled.
struct RefGuard(TaskTracker);

impl Drop for RefGuard {
    fn drop(&mut self) {
        self.0.remove_ref();
    }
}
