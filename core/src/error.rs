// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use davsync_webdav::{DavError, StatusCode};

/// Synchronization errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The `WebDAV` client failed (transport, URL or XML error).
    #[error(transparent)]
    Dav(#[from] DavError),

    /// Reading the local file failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The server did not accept the upload.
    #[error("Upload of {url} rejected with status {status}")]
    UploadRejected {
        /// Target URL.
        url: String,
        /// Status returned by PUT.
        status: StatusCode,
    },

    /// The task panicked; the worker survived.
    #[error("Sync task panicked: {0}")]
    Panicked(String),

    /// The worker side of the queue is gone.
    #[error("Sync queue is closed")]
    QueueClosed,
}
