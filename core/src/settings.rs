// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use davsync_webdav::{DEFAULT_TIMEOUT_SECS, Scheme};

use crate::remote::RetryBudget;
use crate::target::SyncTarget;

/// Key of the settings table in a project file.
pub const SETTINGS_KEY: &str = "webdavsync";

/// Synchronization settings read from the project for a saved file.
///
/// Every field is optional so that an incomplete table deserializes; a file
/// is only synced when all of `host`, `protocol`, `username`, `password`
/// and `path` are present.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SyncSettings {
    /// Host name, optionally with `:port`.
    pub host: Option<String>,
    /// `http` or `https`.
    pub protocol: Option<Scheme>,
    /// Username.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Remote base path the workspace root maps to.
    pub path: Option<String>,
    /// Attempt budget for each PROPFIND probe and MKCOL.
    pub retries: Option<u32>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl SyncSettings {
    /// Builds the sync target, or `None` when a required field is missing.
    #[must_use]
    pub fn target(&self) -> Option<SyncTarget> {
        Some(SyncTarget {
            scheme: self.protocol?,
            host: self.host.clone()?,
            username: self.username.clone()?,
            password: self.password.clone()?,
            remote_base_path: self.path.clone()?,
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Returns the retry budget, defaulting to [`RetryBudget::default`].
    #[must_use]
    pub fn retry_budget(&self) -> RetryBudget {
        self.retries.map_or_else(RetryBudget::default, RetryBudget::uniform)
    }
}
