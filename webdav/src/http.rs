// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with challenge-driven authentication.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};

use crate::auth::{AuthState, Challenge, Credentials};
use crate::config::DavConfig;
use crate::error::DavError;
use crate::request::{Body, DavRequest};
use crate::response::DavResponse;

/// HTTP client bound to one `scheme://host`.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: DavConfig,
    origin: Url,
    credentials: Credentials,
    auth: AuthState,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not form a valid URL or HTTP client
    /// creation fails.
    pub fn new(config: DavConfig) -> Result<Self, DavError> {
        let origin = Url::parse(&config.origin()).map_err(|e| DavError::InvalidUrl {
            url: config.origin(),
            reason: e.to_string(),
        })?;
        let client = build_client(&config)?;
        let credentials = Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
        };
        Ok(Self {
            client,
            config,
            origin,
            credentials,
            auth: AuthState::default(),
        })
    }

    /// Returns the configuration the client was built from.
    pub const fn config(&self) -> &DavConfig {
        &self.config
    }

    /// Returns the authentication state.
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Resolves an absolute URL or a host-relative path.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn resolve(&self, url: &str) -> Result<Url, DavError> {
        self.origin.join(url).map_err(|e| DavError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Sends a request, answering one authentication challenge if needed.
    ///
    /// A 401 carrying a challenge that can be parsed updates the auth state
    /// and the request is replayed exactly once. Any other response,
    /// including a 401 on the replay, is returned to the caller as-is.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure.
    pub async fn execute(&mut self, request: &DavRequest) -> Result<DavResponse, DavError> {
        let url = self.resolve(&request.url)?;

        let response = self.send(request, &url, false).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(challenge) = Challenge::select(response.www_authenticate()) else {
            tracing::debug!(%url, "401 without a usable challenge");
            return Ok(response);
        };
        self.auth.absorb(challenge, &self.credentials);
        self.send(request, &url, true).await
    }

    /// Drops pooled connections; the auth state is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement HTTP client cannot be built.
    pub fn close(&mut self) -> Result<(), DavError> {
        self.client = build_client(&self.config)?;
        Ok(())
    }

    async fn send(
        &mut self,
        request: &DavRequest,
        url: &Url,
        retried: bool,
    ) -> Result<DavResponse, DavError> {
        let mut req = self.client.request(request.method.clone(), url.clone());
        for (name, value) in &request.headers {
            req = req.header(name, value.as_str());
        }

        let uri = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        if let Some(authorization) =
            self.auth
                .authorization(&self.credentials, request.method.as_str(), &uri)
        {
            req = req.header(AUTHORIZATION, authorization);
        }

        req = match &request.body {
            Body::Empty => req,
            Body::Bytes(bytes) => req.body(bytes.clone()),
            Body::Form(fields) => req.form(fields),
        };

        tracing::debug!(method = %request.method, %url, retried, "sending request");
        let resp = req.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();
        tracing::debug!(method = %request.method, %url, %status, "received response");

        Ok(DavResponse::new(status, headers, body))
    }
}

fn build_client(config: &DavConfig) -> Result<Client, DavError> {
    Ok(Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent)
        .build()?)
}
