// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request builders for `WebDAV` operations.

use std::fmt;
use std::io::{Cursor, Write as _};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use reqwest::Method;
use reqwest::header::HeaderName;

use crate::error::DavError;

/// XML namespaces used in `WebDAV`.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";
}

/// Content type sent with property and lock bodies.
pub const XML_CONTENT_TYPE: &str = r#"text/xml; charset="utf-8""#;

/// Header names that `reqwest` does not predefine.
pub mod header {
    use reqwest::header::HeaderName;

    /// `Depth`.
    pub const DEPTH: HeaderName = HeaderName::from_static("depth");
    /// `Destination`.
    pub const DESTINATION: HeaderName = HeaderName::from_static("destination");
    /// `Timeout`.
    pub const TIMEOUT: HeaderName = HeaderName::from_static("timeout");
    /// `Lock-Token`.
    pub const LOCK_TOKEN: HeaderName = HeaderName::from_static("lock-token");
}

/// Value of the `Depth` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// The resource only.
    Zero,
    /// The resource and its direct members.
    One,
    /// The whole subtree.
    Infinity,
}

impl Depth {
    /// Returns the header value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Infinity => "infinity",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock scope requested by LOCK.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockScope {
    /// Only the lock owner may write.
    #[default]
    Exclusive,
    /// Several shared locks may coexist.
    Shared,
}

impl LockScope {
    const fn name(self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::Shared => "shared",
        }
    }
}

/// Lock type requested by LOCK.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockType {
    /// Write lock, the only type defined by RFC 4918.
    #[default]
    Write,
}

impl LockType {
    const fn name(self) -> &'static str {
        match self {
            Self::Write => "write",
        }
    }
}

/// Parses a `WebDAV` extension method such as `PROPFIND`.
///
/// # Errors
///
/// Returns an error if `name` is not a valid HTTP token.
pub fn extension_method(name: &str) -> Result<Method, DavError> {
    Method::from_bytes(name.as_bytes()).map_err(|e| DavError::InvalidMethod(format!("{name}: {e}")))
}

/// Request body.
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Form fields sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

/// A request that can be sent, and replayed once after an auth challenge.
#[derive(Debug, Clone)]
pub struct DavRequest {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: Vec<(HeaderName, String)>,
    pub(crate) body: Body,
}

impl DavRequest {
    /// Creates a request for an absolute URL or a host-relative path.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Sets a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Bytes(body.into());
        self
    }

    /// Sets form fields as the body.
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Body::Form(fields);
        self
    }

    /// Returns the method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URL as given.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Builds the Depth-0 probe body used to test whether a collection exists.
///
/// # Errors
///
/// Returns an error if XML writing fails.
pub fn propfind_probe_body(url: &str) -> Result<String, DavError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .get_mut()
        .write_all(br#"<?xml version="1.0" encoding="utf-8" ?>"#)?;

    // <D:propfind xmlns:D="DAV:">
    let mut propfind = BytesStart::new("D:propfind");
    propfind.push_attribute(("xmlns:D", ns::DAV));
    writer.write_event(Event::Start(propfind))?;

    // <D:prop xmlns:R="{url}"></D:prop>
    let mut prop = BytesStart::new("D:prop");
    prop.push_attribute(("xmlns:R", url));
    writer.write_event(Event::Start(prop))?;
    writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

    writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

    into_string(writer)
}

/// Builds the LOCK request body.
///
/// # Errors
///
/// Returns an error if XML writing fails.
pub fn lock_body(owner: &str, scope: LockScope, kind: LockType) -> Result<String, DavError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut lockinfo = BytesStart::new("DAV:lockinfo");
    lockinfo.push_attribute(("xmlns:DAV", ns::DAV));
    writer.write_event(Event::Start(lockinfo))?;

    writer.write_event(Event::Start(BytesStart::new("DAV:lockscope")))?;
    writer.write_event(Event::Empty(BytesStart::new(format!("DAV:{}", scope.name()))))?;
    writer.write_event(Event::End(BytesEnd::new("DAV:lockscope")))?;

    writer.write_event(Event::Start(BytesStart::new("DAV:locktype")))?;
    writer.write_event(Event::Empty(BytesStart::new(format!("DAV:{}", kind.name()))))?;
    writer.write_event(Event::End(BytesEnd::new("DAV:locktype")))?;

    writer.write_event(Event::Start(BytesStart::new("DAV:owner")))?;
    writer.write_event(Event::Text(BytesText::new(owner)))?;
    writer.write_event(Event::End(BytesEnd::new("DAV:owner")))?;

    writer.write_event(Event::End(BytesEnd::new("DAV:lockinfo")))?;

    into_string(writer)
}

/// Wraps a bare lock token in angle brackets.
#[must_use]
pub fn lock_token_header(token: &str) -> String {
    if token.starts_with('<') {
        token.to_string()
    } else {
        format!("<{token}>")
    }
}

/// Guesses `Content-Type` and `Content-Encoding` from a URL's extension.
///
/// Compression suffixes map to an encoding and the type is then guessed
/// from the remaining name, so `notes.txt.gz` is `text/plain` + `gzip`.
#[must_use]
pub fn guess_content_type(url: &str) -> (Option<String>, Option<&'static str>) {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let (path, encoding) = [(".gz", "gzip"), (".bz2", "bzip2"), (".xz", "xz")]
        .into_iter()
        .find_map(|(suffix, enc)| path.strip_suffix(suffix).map(|stem| (stem, Some(enc))))
        .unwrap_or((path, None));

    let mime = mime_guess::from_path(path).first().map(|m| m.to_string());
    (mime, encoding)
}

fn into_string(writer: Writer<Cursor<Vec<u8>>>) -> Result<String, DavError> {
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| DavError::Xml(format!("UTF-8 error: {e}")))
}
