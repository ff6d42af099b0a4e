// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Responses returned by the `WebDAV` client.

use std::borrow::Cow;

use quick_xml::events::Event;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};

use crate::error::DavError;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct DavResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl DavResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns every `WWW-Authenticate` value that is valid UTF-8.
    pub fn www_authenticate(&self) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// Parses a 207 Multi-Status body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not well-formed XML.
    pub fn multistatus(&self) -> Result<MultiStatus, DavError> {
        MultiStatus::from_xml(&self.text())
    }
}

/// `WebDAV` multistatus response.
#[derive(Debug, Clone, Default)]
pub struct MultiStatus {
    /// The response items.
    pub responses: Vec<PropResponse>,
}

/// Individual `<D:response>` in a multistatus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropResponse {
    /// Resource href.
    pub href: String,
    /// Status code of the first status line found for the resource.
    pub status: Option<u16>,
    /// Whether `resourcetype` contains `collection`.
    pub is_collection: bool,
    /// `getetag`, if reported.
    pub etag: Option<String>,
    /// `getcontentlength`, if reported.
    pub content_length: Option<u64>,
    /// `getlastmodified`, if reported.
    pub last_modified: Option<String>,
}

impl MultiStatus {
    /// Parses multistatus response from XML.
    ///
    /// # Errors
    ///
    /// Returns an error if XML parsing fails.
    pub fn from_xml(xml: &str) -> Result<Self, DavError> {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut responses = Vec::new();
        let mut current: Option<PropResponse> = None;
        let mut element: Vec<u8> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,
                Event::Start(ref e) => {
                    let name = e.local_name().as_ref().to_ascii_lowercase();
                    match name.as_slice() {
                        b"response" => current = Some(PropResponse::default()),
                        b"collection" => mark_collection(current.as_mut()),
                        _ => {}
                    }
                    element = name;
                }
                Event::Empty(ref e) => {
                    if e.local_name().as_ref().eq_ignore_ascii_case(b"collection") {
                        mark_collection(current.as_mut());
                    }
                }
                Event::Text(ref text) => {
                    if let Some(resp) = current.as_mut() {
                        let raw = String::from_utf8_lossy(text);
                        let value = quick_xml::escape::unescape(&raw)
                            .map_or_else(|_| raw.to_string(), Cow::into_owned);
                        match element.as_slice() {
                            b"href" if resp.href.is_empty() => resp.href = value,
                            b"status" if resp.status.is_none() => {
                                resp.status = parse_status(&value);
                            }
                            b"getetag" => resp.etag = Some(value),
                            b"getcontentlength" => resp.content_length = value.parse().ok(),
                            b"getlastmodified" => resp.last_modified = Some(value),
                            _ => {}
                        }
                    }
                }
                Event::End(ref e) => {
                    if e.local_name().as_ref().eq_ignore_ascii_case(b"response") {
                        responses.extend(current.take());
                    }
                    element.clear();
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { responses })
    }
}

fn mark_collection(current: Option<&mut PropResponse>) {
    if let Some(resp) = current {
        resp.is_collection = true;
    }
}

/// Extracts the code from a status line like `HTTP/1.1 200 OK`.
fn parse_status(line: &str) -> Option<u16> {
    line.split_whitespace().nth(1)?.parse().ok()
}
