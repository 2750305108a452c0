//! HTTP client wrapper with request/response interceptors.
//!
//! # Design
//! `ApiClient` is constructed explicitly from a `ClientConfig` and a
//! `Transport`; there is no process-wide instance. Every verb call runs the
//! same pipeline:
//!
//! 1. build an `HttpRequest` against `base_url`,
//! 2. request interceptor: force `content-type: application/json`,
//! 3. execute through the transport,
//! 4. response interceptor: pass 2xx through, log and reject everything else,
//! 5. decode the JSON body.
//!
//! The interceptors only log and classify. They never retry and never
//! swallow an error.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportFailure};
use crate::transport::UreqTransport;

/// Fixed per-request timeout. Not externally configurable.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URL used when `PESSOA_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Environment variable holding the person API base URL.
pub const BASE_URL_ENV: &str = "PESSOA_API_URL";

const JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Read the base URL from `PESSOA_API_URL`, falling back to
    /// [`DEFAULT_BASE_URL`] when it is unset or blank.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BASE_URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// JSON-over-HTTP client bound to one base URL.
#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl ApiClient<UreqTransport> {
    /// Client backed by a blocking `ureq` agent honoring `config.timeout`.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self { config, transport }
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build a request for `path` (which starts with `/`) relative to the base URL.
    pub fn build_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{path}", self.config.base_url))
    }

    pub fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(self.build_request(HttpMethod::Get, path))
    }

    pub fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.build_request(HttpMethod::Post, path);
        let body = serde_json::to_string(body)
            .map_err(|e| reject_before_dispatch(&request, ApiError::Request(e.to_string())))?;
        request.body = Some(body);
        self.send(request)
    }

    pub fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(self.build_request(HttpMethod::Delete, path))
    }

    fn send<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let request = intercept_request(request);
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(TransportFailure::Setup(msg)) => {
                return Err(reject_before_dispatch(&request, ApiError::Request(msg)));
            }
            Err(TransportFailure::NoResponse(msg)) => {
                let err = ApiError::Network(msg);
                tracing::error!(method = %request.method, url = %request.url, "network error: {err}");
                return Err(err);
            }
        };

        let response = intercept_response(&request, response)?;
        decode(&response)
    }
}

/// Request interceptor: JSON content type on every request, body untouched.
fn intercept_request(mut request: HttpRequest) -> HttpRequest {
    request.set_header("content-type", JSON);
    request
}

/// Response interceptor: 2xx passes through unchanged; 404 and 500 get
/// their own log lines; every non-2xx is rejected with its status.
fn intercept_response(request: &HttpRequest, response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }

    let err = ApiError::Status {
        status: response.status,
        body: response.body,
    };
    match err.status() {
        Some(404) => {
            tracing::error!(method = %request.method, url = %request.url, "resource not found: {err}");
        }
        Some(500) => {
            tracing::error!(method = %request.method, url = %request.url, "internal server error: {err}");
        }
        _ => {}
    }
    Err(err)
}

fn reject_before_dispatch(request: &HttpRequest, err: ApiError) -> ApiError {
    tracing::error!(method = %request.method, url = %request.url, "request setup error: {err}");
    err
}

/// An empty 2xx body decodes as JSON `null`, so `()`, `Option<_>` and
/// `IgnoredAny` targets accept bodiless `204` responses.
fn decode<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ApiError> {
    let body = response.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}
