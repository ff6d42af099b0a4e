// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;

/// Snapshot of the work counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkCounts {
    /// Tasks enqueued but not finished.
    pub pending: usize,
    /// Tasks of the current batch that finished with a failure.
    pub failed: usize,
}

/// Tracks in-flight tasks so a UI can show "syncing" versus "idle".
///
/// Incremented once per enqueued task and decremented once per finished
/// task through a [`PendingGuard`], so the count never goes below zero and
/// always returns to zero once the queue drains. A batch runs from the first
/// task enqueued while idle until the count is back at zero; the failure
/// tally covers the current or last batch only.
#[derive(Debug, Clone, Default)]
pub struct PendingWorkCounter {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    counts: Mutex<WorkCounts>,
    idle: Notify,
}

impl PendingWorkCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more pending task, starting a new batch when idle.
    pub fn increment(&self) {
        self.with_counts(|counts| {
            if counts.pending == 0 {
                counts.failed = 0;
            }
            counts.pending += 1;
        });
    }

    /// Returns a guard that finishes one pending task when dropped.
    #[must_use]
    pub fn guard(&self) -> PendingGuard {
        PendingGuard {
            counter: self.clone(),
            failed: false,
        }
    }

    /// Returns the current counts.
    #[must_use]
    pub fn snapshot(&self) -> WorkCounts {
        self.with_counts(|counts| *counts)
    }

    /// Returns the number of pending tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.snapshot().pending
    }

    /// Waits until no task is pending.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn finish(&self, failed: bool) {
        let idle = self.with_counts(|counts| {
            counts.pending = counts.pending.saturating_sub(1);
            if failed {
                counts.failed += 1;
            }
            counts.pending == 0
        });
        if idle {
            self.inner.idle.notify_waiters();
        }
    }

    fn with_counts<T>(&self, f: impl FnOnce(&mut WorkCounts) -> T) -> T {
        let mut counts = self
            .inner
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut counts)
    }
}

/// Finishes one pending task on drop, whether the task succeeded, failed or
/// panicked.
#[derive(Debug)]
pub struct PendingGuard {
    counter: PendingWorkCounter,
    failed: bool,
}

impl PendingGuard {
    /// Counts the task as failed when the guard drops.
    pub fn mark_failed(&mut self) {
        self.failed = true;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.counter.finish(self.failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_decrements_once() {
        let counter = PendingWorkCounter::new();
        counter.increment();
        counter.increment();
        assert_eq!(counter.pending(), 2);

        drop(counter.guard());
        let mut failed = counter.guard();
        failed.mark_failed();
        drop(failed);

        assert_eq!(
            counter.snapshot(),
            WorkCounts {
                pending: 0,
                failed: 1
            }
        );
    }

    #[test]
    fn failures_reset_when_a_batch_starts_from_idle() {
        let counter = PendingWorkCounter::new();
        counter.increment();
        counter.increment();
        let mut failed = counter.guard();
        failed.mark_failed();
        drop(failed);

        // still busy, the tally carries over
        counter.increment();
        assert_eq!(counter.snapshot().failed, 1);
        drop(counter.guard());
        drop(counter.guard());
        assert_eq!(
            counter.snapshot(),
            WorkCounts {
                pending: 0,
                failed: 1
            }
        );

        counter.increment();
        assert_eq!(
            counter.snapshot(),
            WorkCounts {
                pending: 1,
                failed: 0
            }
        );
    }

    #[test]
    fn never_goes_negative() {
        let counter = PendingWorkCounter::new();
        drop(counter.guard());
        assert_eq!(counter.pending(), 0);
    }

    #[tokio::test]
    async fn wait_idle_returns_after_last_guard() {
        let counter = PendingWorkCounter::new();
        counter.increment();
        let guard = counter.guard();

        let waiter = tokio::spawn({
            let counter = counter.clone();
            async move { counter.wait_idle().await }
        });
        tokio::task::yield_now().await;
        drop(guard);

        waiter.await.unwrap();
        assert_eq!(counter.pending(), 0);
    }
}
