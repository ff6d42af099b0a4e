// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// `WebDAV` client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DavError {
    /// HTTP transport error (connection refused, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// XML parsing/writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// A URL could not be parsed or resolved against the client's host.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP method name is not a valid token.
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// The Digest challenge cannot be answered (unsupported qop or algorithm).
    #[error("Cannot answer digest challenge: {0}")]
    Digest(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<quick_xml::Error> for DavError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<std::io::Error> for DavError {
    fn from(e: std::io::Error) -> Self {
        Self::Xml(format!("IO error: {e}"))
    }
}
