// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Save-event queue and the worker that drains it.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use davsync_webdav::{StatusCode, WebDavClient};
use futures::FutureExt;
use tokio::sync::OwnedMutexGuard;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::counter::PendingWorkCounter;
use crate::error::SyncError;
use crate::registry::ClientRegistry;
use crate::remote::{ensure_collections, upload};
use crate::settings::SyncSettings;
use crate::task::{SkipReason, SyncTask, TaskOutcome, TaskReport};

/// Process-scoped state shared by producers and workers.
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    /// Live clients per target.
    pub registry: ClientRegistry,
    /// In-flight task counter.
    pub counter: PendingWorkCounter,
}

/// Creates a queue and the worker that consumes it.
#[must_use]
pub fn sync_queue(context: SyncContext) -> (SyncQueue, SyncWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    let queue = SyncQueue {
        tx,
        context: context.clone(),
    };
    let worker = SyncWorker {
        rx: Arc::new(tokio::sync::Mutex::new(rx)),
        context,
        reports: None,
    };
    (queue, worker)
}

/// What [`SyncQueue::enqueue`] did with a save event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// A task was queued.
    Queued,
    /// The settings are absent or incomplete; nothing to do.
    NotConfigured,
    /// No workspace root contains the file; nothing to do.
    OutsideRoots,
}

/// Producer side: turns save events into queued tasks without touching the
/// network.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    tx: UnboundedSender<SyncTask>,
    context: SyncContext,
}

impl SyncQueue {
    /// Queues an upload of `file` after it was saved.
    ///
    /// The file content is read now, so the upload reflects the file as it
    /// was when saved even if it changes again before the worker gets to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the target's client
    /// cannot be created, or the worker is gone.
    pub fn enqueue(
        &self,
        settings: Option<&SyncSettings>,
        file: &Path,
        roots: &[PathBuf],
    ) -> Result<Enqueued, SyncError> {
        let Some(target) = settings.and_then(SyncSettings::target) else {
            tracing::debug!(file = %file.display(), "no sync settings, ignoring save");
            return Ok(Enqueued::NotConfigured);
        };
        self.context.registry.ensure(&target)?;

        let mut task = SyncTask {
            remote_base_path: target.remote_base_path.clone(),
            target,
            local_file_path: file.to_path_buf(),
            local_root_folders: roots.to_vec(),
            content: Vec::new(),
            budget: settings.map(SyncSettings::retry_budget).unwrap_or_default(),
        };
        if task.matching_root().is_none() {
            tracing::debug!(file = %file.display(), "file is outside every workspace root");
            return Ok(Enqueued::OutsideRoots);
        }

        task.content = std::fs::read(file).map_err(|source| SyncError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        self.push(task)?;
        Ok(Enqueued::Queued)
    }

    /// Queues a prepared task.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker side of the queue was dropped.
    pub fn push(&self, task: SyncTask) -> Result<(), SyncError> {
        self.context.counter.increment();
        self.tx.send(task).map_err(|_| {
            drop(self.context.counter.guard());
            SyncError::QueueClosed
        })
    }

    /// Returns the shared context.
    #[must_use]
    pub const fn context(&self) -> &SyncContext {
        &self.context
    }
}

/// Consumer side: pops tasks in FIFO order and syncs them one at a time.
///
/// Clones share the same queue, so several workers can drain it together.
/// A worker claims the target's client before it lets go of the queue, so
/// tasks for one target still start in the order they were queued; tasks
/// for different targets run in parallel.
#[derive(Debug, Clone)]
pub struct SyncWorker {
    rx: Arc<tokio::sync::Mutex<UnboundedReceiver<SyncTask>>>,
    context: SyncContext,
    reports: Option<UnboundedSender<TaskReport>>,
}

type ClaimedClient = Result<OwnedMutexGuard<WebDavClient>, SyncError>;

impl SyncWorker {
    /// Sends a [`TaskReport`] for every finished task to `reports`.
    #[must_use]
    pub fn with_reports(mut self, reports: UnboundedSender<TaskReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    /// Spawns [`SyncWorker::run`] on the current runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Processes tasks until every [`SyncQueue`] is dropped and the queue is
    /// empty. A failing task never stops the loop.
    pub async fn run(self) {
        while let Some((task, client)) = self.next().await {
            let file = task.local_file_path.clone();
            self.finish(file, self.sync(task, client)).await;
        }
        tracing::debug!("sync queue closed, worker exiting");
    }

    /// Pops the next task and locks its client while still holding the
    /// queue.
    async fn next(&self) -> Option<(SyncTask, ClaimedClient)> {
        let mut rx = self.rx.lock().await;
        let task = rx.recv().await?;
        let client = match self.context.registry.ensure(&task.target) {
            Ok(client) => Ok(client.lock_owned().await),
            Err(e) => Err(e),
        };
        drop(rx);
        Some((task, client))
    }

    /// Drives one task to an outcome, catching panics, then updates the
    /// counter and sends the report.
    async fn finish<F>(&self, file: PathBuf, sync: F)
    where
        F: Future<Output = Result<TaskOutcome, SyncError>>,
    {
        let mut guard = self.context.counter.guard();
        let outcome = match AssertUnwindSafe(sync).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => TaskOutcome::Failed(e),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                TaskOutcome::Failed(SyncError::Panicked(message))
            }
        };

        match &outcome {
            TaskOutcome::Uploaded { url, status } => {
                tracing::info!(file = %file.display(), %url, %status, "uploaded");
            }
            TaskOutcome::Skipped(reason) => {
                tracing::debug!(file = %file.display(), ?reason, "skipped");
            }
            TaskOutcome::Failed(e) => {
                tracing::warn!(file = %file.display(), "sync failed: {e}");
                guard.mark_failed();
            }
        }
        drop(guard);

        if let Some(reports) = &self.reports {
            // observers may have gone away; the worker keeps going
            let _ = reports.send(TaskReport { file, outcome });
        }
    }

    async fn sync(&self, task: SyncTask, client: ClaimedClient) -> Result<TaskOutcome, SyncError> {
        let Some(url) = task.target_url() else {
            return Ok(TaskOutcome::Skipped(SkipReason::NoMatchingRoot));
        };
        let mut client = client?;

        let result: Result<StatusCode, SyncError> = async {
            let report = ensure_collections(&mut client, &url, task.budget).await?;
            tracing::debug!(%url, ?report, "collections ensured");
            upload(&mut client, &url, task.content).await
        }
        .await;

        if let Err(e) = client.close() {
            tracing::warn!("failed to release connections: {e}");
        }

        let status = result?;
        Ok(TaskOutcome::Uploaded { url, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::WorkCounts;

    #[tokio::test]
    async fn panicking_task_is_reported_and_counted() {
        let context = SyncContext::default();
        let (_queue, worker) = sync_queue(context.clone());
        let (tx, mut reports) = mpsc::unbounded_channel();
        let worker = worker.with_reports(tx);

        context.counter.increment();
        let explode = true;
        worker
            .finish(PathBuf::from("/w/a.txt"), async move {
                if explode {
                    panic!("boom");
                }
                Ok(TaskOutcome::Skipped(SkipReason::NoMatchingRoot))
            })
            .await;

        let report = reports.recv().await.unwrap();
        assert_eq!(report.file, PathBuf::from("/w/a.txt"));
        assert!(matches!(
            report.outcome,
            TaskOutcome::Failed(SyncError::Panicked(ref message)) if message == "boom"
        ));
        assert_eq!(
            context.counter.snapshot(),
            WorkCounts {
                pending: 0,
                failed: 1
            }
        );
    }
}
