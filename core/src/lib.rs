// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Save-triggered synchronization of local files to a `WebDAV` server.
//!
//! A host (an editor, or the `davsync` command) calls
//! [`SyncQueue::enqueue`] for every saved file. A [`SyncWorker`] drains the
//! queue in order, creating missing remote collections before uploading,
//! while the [`PendingWorkCounter`] tells the host whether work is left.

mod counter;
mod error;
mod queue;
mod registry;
mod remote;
mod settings;
mod status;
mod target;
mod task;

pub use crate::counter::{PendingGuard, PendingWorkCounter, WorkCounts};
pub use crate::error::SyncError;
pub use crate::queue::{Enqueued, SyncContext, SyncQueue, SyncWorker, sync_queue};
pub use crate::registry::{ClientRegistry, SharedClient};
pub use crate::remote::{DEFAULT_ATTEMPTS, EnsureReport, RetryBudget, ensure_collections, upload};
pub use crate::settings::{SETTINGS_KEY, SyncSettings};
pub use crate::status::{STATUS_INTERVAL, StatusLine};
pub use crate::target::{SyncTarget, TargetKey};
pub use crate::task::{SkipReason, SyncTask, TaskOutcome, TaskReport};
