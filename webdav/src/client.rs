// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `WebDAV` client operations.

use reqwest::Method;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};

use crate::auth::AuthState;
use crate::config::DavConfig;
use crate::error::DavError;
use crate::http::HttpClient;
use crate::request::{
    DavRequest, Depth, LockScope, LockType, XML_CONTENT_TYPE, extension_method,
    guess_content_type, header, lock_body, lock_token_header, propfind_probe_body,
};
use crate::response::DavResponse;

/// `WebDAV` client for one `scheme://host`.
///
/// Every operation issues one HTTP exchange, plus one replay when the
/// server answers with an authentication challenge, and returns the
/// response whatever its status. Interpreting the status is left to the
/// caller.
///
/// The client mutates its authentication state while sending, so it takes
/// `&mut self` and must not be shared between concurrent tasks.
///
/// # Example
///
/// ```ignore
/// use davsync_webdav::{DavConfig, Depth, Scheme, WebDavClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DavConfig::new(Scheme::Https, "dav.example.com", "user", "pass");
/// let mut client = WebDavClient::new(config)?;
/// let resp = client.propfind("/remote/", Some(Depth::Zero), None).await?;
/// println!("{}", resp.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WebDavClient {
    http: HttpClient,
}

impl WebDavClient {
    /// Creates a new `WebDAV` client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(config: DavConfig) -> Result<Self, DavError> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &DavConfig {
        self.http.config()
    }

    /// Returns the authentication state learned so far.
    #[must_use]
    pub const fn auth(&self) -> &AuthState {
        self.http.auth()
    }

    /// Sends an arbitrary request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn execute(&mut self, request: DavRequest) -> Result<DavResponse, DavError> {
        self.http.execute(&request).await
    }

    /// Releases pooled connections while keeping the authentication state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn close(&mut self) -> Result<(), DavError> {
        self.http.close()
    }

    /// GET.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn get(&mut self, url: &str) -> Result<DavResponse, DavError> {
        self.execute(DavRequest::new(Method::GET, url)).await
    }

    /// HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn head(&mut self, url: &str) -> Result<DavResponse, DavError> {
        self.execute(DavRequest::new(Method::HEAD, url)).await
    }

    /// POST with a raw body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn post(
        &mut self,
        url: &str,
        body: impl Into<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<DavResponse, DavError> {
        let mut req = DavRequest::new(Method::POST, url).body(body);
        if let Some(content_type) = content_type {
            req = req.header(CONTENT_TYPE, content_type);
        }
        self.execute(req).await
    }

    /// POST with url-encoded form fields.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn post_form(
        &mut self,
        url: &str,
        fields: Vec<(String, String)>,
    ) -> Result<DavResponse, DavError> {
        self.execute(DavRequest::new(Method::POST, url).form(fields))
            .await
    }

    /// OPTIONS.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn options(&mut self, url: &str) -> Result<DavResponse, DavError> {
        self.execute(DavRequest::new(Method::OPTIONS, url)).await
    }

    /// TRACE.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn trace(&mut self, url: &str) -> Result<DavResponse, DavError> {
        self.execute(DavRequest::new(Method::TRACE, url)).await
    }

    /// PUT. Without an explicit content type one is guessed from the URL.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn put(
        &mut self,
        url: &str,
        content: impl Into<Vec<u8>>,
        content_type: Option<&str>,
    ) -> Result<DavResponse, DavError> {
        let (content_type, encoding) = match content_type {
            Some(content_type) => (Some(content_type.to_string()), None),
            None => guess_content_type(url),
        };

        let mut req = DavRequest::new(Method::PUT, url).body(content);
        if let Some(content_type) = content_type {
            req = req.header(CONTENT_TYPE, content_type);
        }
        if let Some(encoding) = encoding {
            req = req.header(CONTENT_ENCODING, encoding);
        }
        self.execute(req).await
    }

    /// DELETE.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn delete(&mut self, url: &str) -> Result<DavResponse, DavError> {
        self.execute(DavRequest::new(Method::DELETE, url)).await
    }

    /// PROPFIND. Without a body, the Depth-0 existence probe body is sent.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn propfind(
        &mut self,
        url: &str,
        depth: Option<Depth>,
        body: Option<&str>,
    ) -> Result<DavResponse, DavError> {
        let body = match body {
            Some(body) => body.to_string(),
            None => propfind_probe_body(self.http.resolve(url)?.as_str())?,
        };

        let mut req = DavRequest::new(extension_method("PROPFIND")?, url)
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(body);
        if let Some(depth) = depth {
            req = req.header(header::DEPTH, depth.as_str());
        }
        self.execute(req).await
    }

    /// PROPPATCH.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn proppatch(&mut self, url: &str, body: &str) -> Result<DavResponse, DavError> {
        let req = DavRequest::new(extension_method("PROPPATCH")?, url)
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(body);
        self.execute(req).await
    }

    /// MKCOL.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn mkcol(&mut self, url: &str) -> Result<DavResponse, DavError> {
        self.execute(DavRequest::new(extension_method("MKCOL")?, url))
            .await
    }

    /// MOVE `src` to `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn r#move(&mut self, src: &str, dst: &str) -> Result<DavResponse, DavError> {
        let destination = self.http.resolve(dst)?;
        let req = DavRequest::new(extension_method("MOVE")?, src)
            .header(header::DESTINATION, destination.as_str());
        self.execute(req).await
    }

    /// COPY `src` to `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn copy(
        &mut self,
        src: &str,
        dst: &str,
        depth: Option<Depth>,
    ) -> Result<DavResponse, DavError> {
        let destination = self.http.resolve(dst)?;
        let mut req = DavRequest::new(extension_method("COPY")?, src)
            .header(header::DESTINATION, destination.as_str());
        if let Some(depth) = depth {
            req = req.header(header::DEPTH, depth.as_str());
        }
        self.execute(req).await
    }

    /// LOCK.
    ///
    /// `timeout` is sent verbatim, e.g. `Second-3600` or `Infinite`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn lock(
        &mut self,
        url: &str,
        owner: &str,
        timeout: Option<&str>,
        depth: Option<Depth>,
        scope: LockScope,
        kind: LockType,
    ) -> Result<DavResponse, DavError> {
        let mut req = DavRequest::new(extension_method("LOCK")?, url)
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(lock_body(owner, scope, kind)?);
        if let Some(depth) = depth {
            req = req.header(header::DEPTH, depth.as_str());
        }
        if let Some(timeout) = timeout {
            req = req.header(header::TIMEOUT, timeout);
        }
        self.execute(req).await
    }

    /// UNLOCK.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn unlock(&mut self, url: &str, lock_token: &str) -> Result<DavResponse, DavError> {
        let req = DavRequest::new(extension_method("UNLOCK")?, url)
            .header(header::LOCK_TOKEN, lock_token_header(lock_token));
        self.execute(req).await
    }
}
