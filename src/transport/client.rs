use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::Client;

use crate::error::TransportError;

use super::{Body, Request, Response, RoundTrip};

const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub insecure_tls: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(9),
            insecure_tls: false,
        }
    }
}

/// Sends requests over the network with a shared reqwest connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend or client cannot be initialized.
    pub fn new(settings: &ClientSettings) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .tcp_keepalive(TCP_KEEPALIVE)
            .user_agent(concat!("ec2auth/", env!("CARGO_PKG_VERSION")));

        if settings.insecure_tls {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let client = builder
            .build()
            .map_err(|source| TransportError::BuildClient { source })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RoundTrip for HttpTransport {
    async fn round_trip(&self, request: Request) -> Result<Response, TransportError> {
        let Request {
            method,
            url,
            headers,
            body,
        } = request;

        // reqwest needs a sized body to set Content-Length; the payloads here
        // are small JSON documents.
        let payload = body
            .collect()
            .await
            .map_err(|source| TransportError::BodyRead { source })?;

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .body(payload)
            .send()
            .await
            .map_err(|err| TransportError::Connect {
                source: Box::new(err),
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = Body::from_stream(response.bytes_stream().map_err(io::Error::other));

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
