//! HTTP transport: a reqwest-backed round-tripper and an instrumented
//! decorator that adds headers, retries connection failures, and logs
//! traffic with secrets masked.
mod body;
mod client;
mod headers;
mod instrumented;
mod logger;
mod redact;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode, header::CONTENT_TYPE};
use url::Url;

use crate::error::TransportError;

pub use body::{Body, BodyStream};
pub use client::{ClientSettings, HttpTransport};
pub use headers::{DEFAULT_SENSITIVE_HEADERS, SensitiveHeaders, format_headers};
pub use instrumented::{InstrumentedTransport, TransportConfig};
pub use logger::{Direction, TrafficLogger};
pub use redact::{BodyFormatter, Formatted, MASK, format_json};

#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Body,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Copies the request for another attempt. Streaming bodies cannot be
    /// replayed, so those return `None`.
    #[must_use]
    pub fn try_clone(&self) -> Option<Self> {
        Some(Self {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.try_clone()?,
        })
    }
}

#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Body>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

pub(crate) fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// One request/response exchange.
///
/// A `TransportError::Connect` means no response was received and the
/// request may be retried; every other error is final.
#[async_trait]
pub trait RoundTrip: Send + Sync {
    async fn round_trip(&self, request: Request) -> Result<Response, TransportError>;
}

#[async_trait]
impl<T> RoundTrip for std::sync::Arc<T>
where
    T: RoundTrip + ?Sized,
{
    async fn round_trip(&self, request: Request) -> Result<Response, TransportError> {
        self.as_ref().round_trip(request).await
    }
}
