//! The `HttpClient` collaborator (spec §4.D, §6): request/response encoding, transport, and
//! SigV4 signing live outside this crate's scope. Only the minimal surface providers need is
//! defined here, plus an optional `reqwest`-backed default implementation.

use crate::error::{CredentialError, Result};
use crate::executor::Executor;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::time::Duration;

/// A minimal HTTP request, independent of any particular transport crate.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Request {
    /// Build a GET request with no headers and an empty body.
    pub fn get(url: impl Into<String>) -> Self {
        Request {
            url: url.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Build a PUT request with no headers and an empty body.
    pub fn put(url: impl Into<String>) -> Self {
        Request {
            url: url.into(),
            method: Method::PUT,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Attach a single header, replacing any existing value for that name.
    pub fn with_header(mut self, name: &'static str, value: impl AsRef<str>) -> Self {
        if let Ok(value) = http::HeaderValue::from_str(value.as_ref()) {
            self.headers.insert(name, value);
        }
        self
    }
}

/// A minimal HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// The body decoded as a lossy UTF-8 string.
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Executes a single request with a timeout, returning status, headers and body.
///
/// Implementations are assumed thread-safe (spec §5): the same client may be shared across
/// concurrently-refreshing providers.
#[async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Execute `request`, failing with [`CredentialError::Timeout`] if `timeout` elapses first.
    /// `executor` is accepted for interface symmetry with the rest of the provider surface
    /// (spec §6); see `crate::executor` for how continuations are hopped back to it.
    async fn execute(
        &self,
        request: Request,
        timeout: Duration,
        executor: &Executor,
    ) -> Result<Response>;
}

/// Default [`HttpClient`] backed by `reqwest`, mirroring the teacher's reliance on a real HTTP
/// crate (`reqwest` appears in its workspace dependencies) rather than a hand-rolled client.
#[cfg(feature = "reqwest-client")]
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest-client")]
impl ReqwestHttpClient {
    /// Construct a client using `reqwest`'s default configuration.
    pub fn new() -> Self {
        ReqwestHttpClient {
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "reqwest-client")]
#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(
        &self,
        request: Request,
        timeout: Duration,
        _executor: &Executor,
    ) -> Result<Response> {
        let req = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body)
            .timeout(timeout);

        let resp = tokio::time::timeout(timeout, req.send())
            .await
            .map_err(|_| CredentialError::Timeout(request.url.clone()))?
            .map_err(CredentialError::http)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(CredentialError::http)?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
