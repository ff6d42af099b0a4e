// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP Basic and Digest (RFC 2617) authentication state.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};
use regex::Regex;
use sha1::Sha1;

use crate::error::DavError;

static AUTH_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z][a-z0-9_-]*)\s*=\s*(?:"([^"]*)"|([^\s,"]+))"#)
        .expect("auth-param pattern is valid")
});

/// Username and password offered to the server.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// A parsed `WWW-Authenticate` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    /// `Basic realm=...`.
    Basic,
    /// `Digest realm=..., nonce=..., ...`.
    Digest(DigestChallenge),
}

impl Challenge {
    /// Parses a single `WWW-Authenticate` header value.
    ///
    /// Digest wins over Basic when the header offers both. A Digest challenge
    /// without `realm` or `nonce` is not answerable and yields `None` unless
    /// the header also offers Basic.
    #[must_use]
    pub fn parse(header: &str) -> Option<Self> {
        let lower = header.to_ascii_lowercase();
        if let Some(start) = scheme_token(&lower, "digest") {
            let params = auth_params(header.get(start + "digest".len()..).unwrap_or_default());
            if let Some(digest) = DigestChallenge::from_params(params) {
                return Some(Self::Digest(digest));
            }
        }
        scheme_token(&lower, "basic").map(|_| Self::Basic)
    }

    /// Picks the most capable challenge among several header values.
    pub fn select<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut best = None;
        for challenge in headers.into_iter().filter_map(Self::parse) {
            match challenge {
                Self::Digest(_) => return Some(challenge),
                Self::Basic => best = Some(challenge),
            }
        }
        best
    }
}

/// Parameters of a Digest challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    /// Protection space.
    pub realm: String,
    /// Server nonce.
    pub nonce: String,
    /// Quality of protection options, as sent by the server.
    pub qop: Option<String>,
    /// Opaque value echoed back verbatim.
    pub opaque: Option<String>,
    /// Hash algorithm name, as sent by the server.
    pub algorithm: Option<String>,
}

impl DigestChallenge {
    fn from_params(mut params: HashMap<String, String>) -> Option<Self> {
        Some(Self {
            realm: params.remove("realm")?,
            nonce: params.remove("nonce")?,
            qop: params.remove("qop"),
            opaque: params.remove("opaque"),
            algorithm: params.remove("algorithm"),
        })
    }

    /// Builds the `Authorization` header value for one request.
    ///
    /// `uri` is the request target (`path[?query]`), `nc` the nonce count
    /// for this use of the nonce and `cnonce` the client nonce.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is unknown or the server only offers
    /// qop values other than `auth`.
    pub fn authorization(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        nc: u32,
        cnonce: &str,
    ) -> Result<String, DavError> {
        let algorithm = DigestAlgorithm::parse(self.algorithm.as_deref())?;
        let nonce = &self.nonce;
        let nc_value = format!("{nc:08x}");

        let a1 = format!(
            "{}:{}:{}",
            credentials.username, self.realm, credentials.password
        );
        let a2 = format!("{method}:{uri}");

        let mut ha1 = algorithm.hash(&a1);
        let ha2 = algorithm.hash(&a2);
        if algorithm == DigestAlgorithm::Md5Sess {
            ha1 = algorithm.hash(&format!("{ha1}:{nonce}:{cnonce}"));
        }

        let response = match self.qop.as_deref() {
            None => algorithm.hash(&format!("{ha1}:{nonce}:{ha2}")),
            Some(qop) if qop.split(',').any(|q| q.trim().eq_ignore_ascii_case("auth")) => {
                algorithm.hash(&format!("{ha1}:{nonce}:{nc_value}:{cnonce}:auth:{ha2}"))
            }
            Some(qop) => return Err(DavError::Digest(format!("unsupported qop '{qop}'"))),
        };

        let mut header = format!(
            r#"Digest username="{}", realm="{}", nonce="{nonce}", uri="{uri}", response="{response}""#,
            credentials.username, self.realm,
        );
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(r#", opaque="{opaque}""#));
        }
        if let Some(name) = &self.algorithm {
            header.push_str(&format!(r#", algorithm="{name}""#));
        }
        if self.qop.is_some() {
            header.push_str(&format!(r#", qop="auth", nc={nc_value}, cnonce="{cnonce}""#));
        }
        Ok(header)
    }
}

/// Hash function named by the challenge's `algorithm` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// `MD5`, the default.
    Md5,
    /// `MD5-sess`.
    Md5Sess,
    /// `SHA` (SHA-1).
    Sha,
}

impl DigestAlgorithm {
    fn parse(name: Option<&str>) -> Result<Self, DavError> {
        match name.map(str::to_ascii_uppercase).as_deref() {
            None | Some("MD5") => Ok(Self::Md5),
            Some("MD5-SESS") => Ok(Self::Md5Sess),
            Some("SHA") => Ok(Self::Sha),
            Some(other) => Err(DavError::Digest(format!("unsupported algorithm '{other}'"))),
        }
    }

    fn hash(self, data: &str) -> String {
        match self {
            Self::Md5 | Self::Md5Sess => format!("{:x}", Md5::digest(data.as_bytes())),
            Self::Sha => format!("{:x}", Sha1::digest(data.as_bytes())),
        }
    }
}

/// Authentication mode learned from the server.
#[derive(Debug, Clone, Default)]
pub enum AuthMode {
    /// No challenge seen yet; requests go out without credentials.
    #[default]
    None,
    /// Precomputed `Basic ...` header value.
    Basic(String),
    /// Latest Digest challenge.
    Digest(DigestChallenge),
}

/// Per-client authentication state.
///
/// Starts unauthenticated and upgrades the first time a 401 carries a
/// challenge it can parse. The nonce count restarts whenever the server
/// issues a new nonce, so a `(nonce, nc)` pair is never sent twice.
#[derive(Debug, Default)]
pub struct AuthState {
    mode: AuthMode,
    nonce_count: u32,
}

impl AuthState {
    /// Returns the current mode.
    #[must_use]
    pub const fn mode(&self) -> &AuthMode {
        &self.mode
    }

    /// Returns how many Digest headers were built for the current nonce.
    #[must_use]
    pub const fn nonce_count(&self) -> u32 {
        self.nonce_count
    }

    /// Applies a challenge from a 401 response.
    pub fn absorb(&mut self, challenge: Challenge, credentials: &Credentials) {
        match challenge {
            Challenge::Digest(digest) => {
                let fresh = match &self.mode {
                    AuthMode::Digest(current) => current.nonce != digest.nonce,
                    AuthMode::None | AuthMode::Basic(_) => true,
                };
                if fresh {
                    tracing::debug!(realm = %digest.realm, "switching to digest authentication");
                    self.nonce_count = 0;
                    self.mode = AuthMode::Digest(digest);
                }
            }
            Challenge::Basic => {
                tracing::debug!("switching to basic authentication");
                let token = STANDARD.encode(format!(
                    "{}:{}",
                    credentials.username, credentials.password
                ));
                self.mode = AuthMode::Basic(format!("Basic {token}"));
            }
        }
    }

    /// Computes the `Authorization` header for the next request, if any.
    ///
    /// Returns `None` before any challenge was seen, and also when the
    /// Digest challenge cannot be answered; the request then goes out
    /// without credentials and the server's 401 reaches the caller.
    pub fn authorization(
        &mut self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
    ) -> Option<String> {
        match &self.mode {
            AuthMode::None => None,
            AuthMode::Basic(header) => Some(header.clone()),
            AuthMode::Digest(challenge) => {
                self.nonce_count += 1;
                let cnonce = generate_cnonce(self.nonce_count, &challenge.nonce);
                match challenge.authorization(credentials, method, uri, self.nonce_count, &cnonce)
                {
                    Ok(header) => Some(header),
                    Err(e) => {
                        tracing::warn!("{e}, sending request without credentials");
                        None
                    }
                }
            }
        }
    }
}

/// Generates a 16 hex digit client nonce from the nonce count, the server
/// nonce, the current time and 8 random bytes.
#[must_use]
pub fn generate_cnonce(nc: u32, nonce: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nc.to_string().as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(jiff::Timestamp::now().to_string().as_bytes());
    hasher.update(rand::random::<[u8; 8]>());
    let mut cnonce = format!("{:x}", hasher.finalize());
    cnonce.truncate(16);
    cnonce
}

/// Finds `scheme` where it names a challenge: at the start of the header or
/// after a comma, outside quotes, and not followed by `=`.
fn scheme_token(lower: &str, scheme: &str) -> Option<usize> {
    lower.match_indices(scheme).map(|(i, _)| i).find(|&i| {
        let before = lower.get(..i).unwrap_or_default();
        let after = lower.get(i + scheme.len()..).unwrap_or_default();
        let quoted = before.matches('"').count() % 2 == 1;
        let leading = before.trim_end();
        !quoted
            && (leading.is_empty() || leading.ends_with(','))
            && after.chars().next().is_none_or(|c| c.is_whitespace() || c == ',')
    })
}

fn auth_params(s: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for caps in AUTH_PARAM.captures_iter(s) {
        let (Some(name), Some(value)) = (caps.get(1), caps.get(2).or_else(|| caps.get(3))) else {
            continue;
        };
        params
            .entry(name.as_str().to_ascii_lowercase())
            .or_insert_with(|| value.as_str().to_string());
    }
    params
}
