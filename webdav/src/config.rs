// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use crate::error::DavError;

/// URL scheme used to reach the `WebDAV` host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = DavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(DavError::Config(format!(
                "unsupported protocol '{other}', expected 'http' or 'https'"
            ))),
        }
    }
}

/// `WebDAV` server configuration.
///
/// A client is bound to exactly one `(scheme, host)` pair; requests name
/// either absolute URLs on that host or host-relative paths.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DavConfig {
    /// URL scheme.
    #[serde(default)]
    pub scheme: Scheme,
    /// Host name, optionally with `:port`.
    pub host: String,
    /// Username offered when the server asks for credentials.
    #[serde(default)]
    pub username: String,
    /// Password offered when the server asks for credentials.
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl DavConfig {
    /// Creates a configuration with default timeout and user agent.
    #[must_use]
    pub fn new(
        scheme: Scheme,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            scheme,
            host: host.into(),
            username: username.into(),
            password: password.into(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }

    /// Returns `scheme://host`.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    concat!("davsync-webdav/", env!("CARGO_PKG_VERSION")).to_string()
}
