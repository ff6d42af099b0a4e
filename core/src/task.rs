// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use davsync_webdav::StatusCode;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::SyncError;
use crate::remote::RetryBudget;
use crate::target::SyncTarget;

/// Bytes escaped in a path segment (the URL standard's path set plus `%`).
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One pending upload, produced by a save event and consumed once.
#[derive(Debug, Clone)]
pub struct SyncTask {
    /// Where to upload.
    pub target: SyncTarget,
    /// The saved file.
    pub local_file_path: PathBuf,
    /// Open workspace roots, in priority order.
    pub local_root_folders: Vec<PathBuf>,
    /// Remote path the matching root maps to.
    pub remote_base_path: String,
    /// File content captured when the task was enqueued.
    pub content: Vec<u8>,
    /// Attempt budget for collection probing and creation.
    pub budget: RetryBudget,
}

impl SyncTask {
    /// Returns the first root that contains the saved file.
    #[must_use]
    pub fn matching_root(&self) -> Option<&Path> {
        self.local_root_folders
            .iter()
            .map(PathBuf::as_path)
            .filter(|root| !root.as_os_str().is_empty())
            .find(|root| self.local_file_path.starts_with(root))
    }

    /// Maps the saved file to its remote path, with `/` separators.
    ///
    /// Each segment below the root is percent-encoded, so the path is ready
    /// to be appended to the origin. The base path is used as configured.
    #[must_use]
    pub fn remote_path(&self) -> Option<String> {
        let root = self.matching_root()?;
        let relative = self.local_file_path.strip_prefix(root).ok()?;
        let relative = relative.to_string_lossy().replace('\\', "/");
        let relative = relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        let base = self.remote_base_path.replace('\\', "/");
        Some(format!("{}/{relative}", base.trim_end_matches('/')))
    }

    /// Returns the full URL the file is uploaded to.
    #[must_use]
    pub fn target_url(&self) -> Option<String> {
        self.remote_path()
            .map(|path| format!("{}{path}", self.target.origin()))
    }
}

/// Result of processing one task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The server accepted the upload.
    Uploaded {
        /// Target URL.
        url: String,
        /// Status returned by PUT.
        status: StatusCode,
    },
    /// Nothing was uploaded, deliberately.
    Skipped(SkipReason),
    /// The upload failed.
    Failed(SyncError),
}

impl TaskOutcome {
    /// Returns `true` for [`TaskOutcome::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Why a task was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No workspace root contains the saved file.
    NoMatchingRoot,
}

/// A finished task, as reported to observers of the worker.
#[derive(Debug)]
pub struct TaskReport {
    /// The saved file.
    pub file: PathBuf,
    /// What happened.
    pub outcome: TaskOutcome,
}

#[cfg(test)]
mod tests {
    use davsync_webdav::Scheme;

    use super::*;

    fn task(file: &str, roots: &[&str], base: &str) -> SyncTask {
        SyncTask {
            target: SyncTarget {
                scheme: Scheme::Https,
                host: "example.com".to_string(),
                username: "u".to_string(),
                password: "p".to_string(),
                remote_base_path: base.to_string(),
                timeout_secs: 30,
            },
            local_file_path: PathBuf::from(file),
            local_root_folders: roots.iter().map(PathBuf::from).collect(),
            remote_base_path: base.to_string(),
            content: Vec::new(),
            budget: RetryBudget::default(),
        }
    }

    #[test]
    fn resolves_url_under_matching_root() {
        let task = task("/home/u/project/a/b.txt", &["/home/u/project"], "/remote");
        assert_eq!(
            task.target_url().as_deref(),
            Some("https://example.com/remote/a/b.txt")
        );
    }

    #[test]
    fn first_matching_root_wins() {
        let task = task(
            "/home/u/project/sub/x.rs",
            &["/elsewhere", "/home/u/project", "/home/u/project/sub"],
            "/r/",
        );
        assert_eq!(task.matching_root(), Some(Path::new("/home/u/project")));
        assert_eq!(task.remote_path().as_deref(), Some("/r/sub/x.rs"));
    }

    #[test]
    fn root_matches_whole_components_only() {
        let task = task("/home/u/project2/a.txt", &["/home/u/project"], "/remote");
        assert_eq!(task.target_url(), None);
    }

    #[test]
    fn backslashes_become_slashes() {
        let task = task("/home/u/project/a\\b.txt", &["/home/u/project"], "\\remote");
        assert_eq!(task.remote_path().as_deref(), Some("/remote/a/b.txt"));
    }

    #[test]
    fn reserved_characters_are_escaped_per_segment() {
        let reserved = task("/w/a b/notes#1?.md", &["/w"], "/remote");
        assert_eq!(
            reserved.target_url().as_deref(),
            Some("https://example.com/remote/a%20b/notes%231%3F.md")
        );

        let percent = task("/w/100%.txt", &["/w"], "/remote");
        assert_eq!(percent.remote_path().as_deref(), Some("/remote/100%25.txt"));

        let accented = task("/w/caf\u{e9}.md", &["/w"], "/remote");
        assert_eq!(accented.remote_path().as_deref(), Some("/remote/caf%C3%A9.md"));
    }

    #[test]
    fn empty_base_maps_to_host_root() {
        let task = task("/w/a.txt", &["/w"], "");
        assert_eq!(task.target_url().as_deref(), Some("https://example.com/a.txt"));
    }
}
