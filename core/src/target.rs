// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use davsync_webdav::{DavConfig, Scheme};

/// Identity of a remote sync destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    /// URL scheme.
    pub scheme: Scheme,
    /// Host name, optionally with `:port`.
    pub host: String,
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
    /// Remote base path the workspace root maps to.
    pub remote_base_path: String,
    /// Request timeout in seconds for the target's client.
    pub timeout_secs: u64,
}

impl SyncTarget {
    /// Returns the key under which the target's client is shared.
    #[must_use]
    pub fn key(&self) -> TargetKey {
        TargetKey {
            username: self.username.clone(),
            host: self.host.clone(),
            remote_base_path: self.remote_base_path.clone(),
        }
    }

    /// Returns `scheme://host`.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Builds the client configuration for this target.
    #[must_use]
    pub fn dav_config(&self) -> DavConfig {
        DavConfig {
            timeout_secs: self.timeout_secs,
            ..DavConfig::new(
                self.scheme,
                self.host.clone(),
                self.username.clone(),
                self.password.clone(),
            )
        }
    }
}

/// `(username, host, remote base path)`: targets with equal keys share one
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    /// Username.
    pub username: String,
    /// Host name.
    pub host: String,
    /// Remote base path.
    pub remote_base_path: String,
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}{}", self.username, self.host, self.remote_base_path)
    }
}
