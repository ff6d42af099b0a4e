// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Remote side of a sync: create missing collections, then upload.

use davsync_webdav::{DavError, Depth, StatusCode, WebDavClient};

use crate::error::SyncError;

/// Default number of attempts for each probe and each MKCOL.
pub const DEFAULT_ATTEMPTS: u32 = 10;

/// Attempt budgets for collection probing and creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    /// PROPFIND attempts per probed collection.
    pub probe_attempts: u32,
    /// MKCOL attempts per missing collection.
    pub mkcol_attempts: u32,
}

impl RetryBudget {
    /// Uses the same budget for probing and creation.
    #[must_use]
    pub const fn uniform(attempts: u32) -> Self {
        Self {
            probe_attempts: attempts,
            mkcol_attempts: attempts,
        }
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::uniform(DEFAULT_ATTEMPTS)
    }
}

/// What [`ensure_collections`] found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnsureReport {
    /// Whether an existing ancestor collection was confirmed.
    pub ancestor_found: bool,
    /// Paths of collections that MKCOL created, shallowest first.
    pub created: Vec<String>,
    /// Paths whose MKCOL never returned 201.
    pub failed: Vec<String>,
}

/// Makes sure every collection above `url` exists.
///
/// Probes the parent of `url` with Depth-0 PROPFIND and walks up on 404
/// until a probe returns 207 or the host root is reached, then issues MKCOL
/// for the missing segments from the shallowest to the deepest. Failures
/// are reported but do not stop the walk: the upload that follows is the
/// visible signal.
///
/// # Errors
///
/// Returns an error on transport failure.
pub async fn ensure_collections(
    client: &mut WebDavClient,
    url: &str,
    budget: RetryBudget,
) -> Result<EnsureReport, DavError> {
    let (origin, path) = split_origin(url);
    let mut probe = parent(path).to_string();
    let mut missing = Vec::new();
    let mut report = EnsureReport::default();

    let mut attempts = 0;
    loop {
        if probe.is_empty() {
            // host root
            report.ancestor_found = true;
            break;
        }
        if attempts >= budget.probe_attempts {
            tracing::warn!(collection = %probe, "giving up probing after {attempts} attempts");
            break;
        }
        attempts += 1;

        let resp = client
            .propfind(&format!("{origin}{probe}"), Some(Depth::Zero), None)
            .await?;
        match resp.status() {
            StatusCode::MULTI_STATUS => {
                report.ancestor_found = true;
                break;
            }
            StatusCode::NOT_FOUND => {
                let cut = probe.rfind('/').unwrap_or(0);
                missing.push(probe.split_off(cut));
                attempts = 0;
            }
            status if is_transient(status) => {
                tracing::debug!(collection = %probe, %status, attempts, "retrying probe");
            }
            status => {
                tracing::warn!(collection = %probe, %status, "collection state unknown");
                break;
            }
        }
    }

    if !report.ancestor_found {
        return Ok(report);
    }

    for segment in missing.iter().rev() {
        probe.push_str(segment);
        let mut created = false;
        for attempt in 1..=budget.mkcol_attempts {
            let resp = client.mkcol(&format!("{origin}{probe}")).await?;
            if resp.status() == StatusCode::CREATED {
                created = true;
                break;
            }
            let status = resp.status();
            tracing::debug!(collection = %probe, %status, attempt, "MKCOL not created");
        }
        if created {
            report.created.push(probe.clone());
        } else {
            tracing::warn!(collection = %probe, "could not create collection");
            report.failed.push(probe.clone());
        }
    }

    Ok(report)
}

/// Uploads `content` to `url`. Only 2xx responses count as success.
///
/// # Errors
///
/// Returns an error on transport failure or when the server rejects the
/// upload.
pub async fn upload(
    client: &mut WebDavClient,
    url: &str,
    content: Vec<u8>,
) -> Result<StatusCode, SyncError> {
    let resp = client.put(url, content, None).await?;
    if resp.is_success() {
        Ok(resp.status())
    } else {
        Err(SyncError::UploadRejected {
            url: url.to_string(),
            status: resp.status(),
        })
    }
}

/// Server-side conditions worth probing again.
fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Splits `scheme://host/path` into `scheme://host` and `/path`.
fn split_origin(url: &str) -> (&str, &str) {
    let host_start = url.find("://").map_or(0, |i| i + 3);
    match url.get(host_start..).and_then(|rest| rest.find('/')) {
        Some(i) => url.split_at(host_start + i),
        None => (url, ""),
    }
}

/// Truncates a path at its last `/`.
fn parent(path: &str) -> &str {
    path.rfind('/').map_or("", |i| path.get(..i).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_origin_separates_path() {
        assert_eq!(
            split_origin("https://example.com/remote/a/b.txt"),
            ("https://example.com", "/remote/a/b.txt")
        );
        assert_eq!(
            split_origin("http://127.0.0.1:8080"),
            ("http://127.0.0.1:8080", "")
        );
    }

    #[test]
    fn parent_truncates_at_last_slash() {
        assert_eq!(parent("/remote/a/b.txt"), "/remote/a");
        assert_eq!(parent("/b.txt"), "");
        assert_eq!(parent(""), "");
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient(StatusCode::FORBIDDEN));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
    }
}
