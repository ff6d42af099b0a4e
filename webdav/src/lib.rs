// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `WebDAV` client (RFC 4918) with transparent Basic and Digest (RFC 2617)
//! authentication.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::similar_names, clippy::single_match_else)]

mod auth;
mod client;
mod config;
mod error;
mod http;
mod request;
mod response;

pub use crate::auth::{
    AuthMode, AuthState, Challenge, Credentials, DigestAlgorithm, DigestChallenge,
    generate_cnonce,
};
pub use crate::client::WebDavClient;
pub use crate::config::{DEFAULT_TIMEOUT_SECS, DavConfig, Scheme};
pub use crate::error::DavError;
pub use crate::request::{
    Body, DavRequest, Depth, LockScope, LockType, XML_CONTENT_TYPE, extension_method,
    guess_content_type, header, lock_body, lock_token_header, ns, propfind_probe_body,
};
pub use crate::response::{DavResponse, MultiStatus, PropResponse};
pub use reqwest::{Method, StatusCode};
