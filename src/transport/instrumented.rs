use std::time::Duration;

use async_trait::async_trait;
use http::{
    HeaderMap,
    header::{HOST, HeaderName, HeaderValue},
};
use tokio::time::Instant;

use crate::error::TransportError;

use super::headers::{SensitiveHeaders, format_headers};
use super::logger::{Direction, TrafficLogger};
use super::redact::{BodyFormatter, format_json};
use super::{Request, Response, RoundTrip, content_type};

/// Settings fixed before the transport is shared between workers.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Extra attempts after a connection failure.
    pub max_retries: usize,
    /// Wall-clock ceiling for retrying; `None` bounds retries by count only.
    pub retry_budget: Option<Duration>,
    pub sensitive_headers: SensitiveHeaders,
    /// Set on every request, replacing any header with the same name.
    pub extra_headers: HeaderMap,
    pub host_override: Option<HeaderValue>,
    pub formatter: BodyFormatter,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_budget: None,
            sensitive_headers: SensitiveHeaders::default(),
            extra_headers: HeaderMap::new(),
            host_override: None,
            formatter: format_json,
        }
    }
}

impl TransportConfig {
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_retry_budget(mut self, budget: Option<Duration>) -> Self {
        self.retry_budget = budget;
        self
    }

    #[must_use]
    pub fn with_sensitive_headers(mut self, sensitive: SensitiveHeaders) -> Self {
        self.sensitive_headers = sensitive;
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: BodyFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Adds a value for an extra header. Repeating a name keeps every value.
    ///
    /// # Errors
    ///
    /// Returns an error when the name or value is not a valid HTTP header.
    pub fn with_extra_header(mut self, name: &str, value: &str) -> Result<Self, TransportError> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| TransportError::InvalidHeader {
                name: name.to_owned(),
                reason: err.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|err| TransportError::InvalidHeader {
                name: name.to_owned(),
                reason: err.to_string(),
            })?;
        self.extra_headers.append(header_name, header_value);
        Ok(self)
    }

    /// Replaces the `Host` header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error when `host` is not a valid header value.
    pub fn with_host_override(mut self, host: &str) -> Result<Self, TransportError> {
        let value = HeaderValue::from_str(host).map_err(|err| TransportError::InvalidHeader {
            name: HOST.as_str().to_owned(),
            reason: err.to_string(),
        })?;
        self.host_override = Some(value);
        Ok(self)
    }

    fn apply_headers(&self, headers: &mut HeaderMap) {
        for name in self.extra_headers.keys() {
            headers.remove(name);
            for value in self.extra_headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        if let Some(host) = self.host_override.as_ref() {
            headers.insert(HOST, host.clone());
        }
    }
}

/// Decorates another [`RoundTrip`] with header injection, connection
/// retries and optional traffic logging.
///
/// The configuration is immutable once constructed, so one instance can be
/// shared by any number of concurrent callers without locking.
#[derive(Debug)]
pub struct InstrumentedTransport<T> {
    inner: T,
    config: TransportConfig,
    logger: Option<TrafficLogger>,
}

impl<T> InstrumentedTransport<T>
where
    T: RoundTrip,
{
    pub const fn new(inner: T, config: TransportConfig, logger: Option<TrafficLogger>) -> Self {
        Self {
            inner,
            config,
            logger,
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.inner
    }

    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    #[must_use]
    pub const fn logger(&self) -> Option<TrafficLogger> {
        self.logger
    }

    async fn send_with_retries(&self, request: Request) -> Result<Response, TransportError> {
        let started = Instant::now();
        let max_retries = self.config.max_retries;
        let mut request = request;
        let mut retry: usize = 0;

        loop {
            let spare = if retry < max_retries {
                request.try_clone()
            } else {
                None
            };

            let err = match self.inner.round_trip(request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_connection_failure() => err,
                Err(err) => return Err(err),
            };

            retry = retry.saturating_add(1);
            let Some(next) = spare else {
                if let Some(logger) = self.logger {
                    logger.response("Connection error, retries exhausted. Aborting");
                }
                return Err(TransportError::RetriesExhausted {
                    attempts: retry,
                    source: Box::new(err),
                });
            };

            if let Some(budget) = self.config.retry_budget {
                let elapsed = started.elapsed();
                if elapsed >= budget {
                    if let Some(logger) = self.logger {
                        logger.response("Connection error, retry budget exceeded. Aborting");
                    }
                    return Err(TransportError::RetryBudgetExceeded {
                        budget,
                        elapsed,
                        source: Box::new(err),
                    });
                }
            }

            if let Some(logger) = self.logger {
                logger.response(&format!("Connection error, retry number {}: {}", retry, err));
            }
            request = next;
        }
    }
}

#[async_trait]
impl<T> RoundTrip for InstrumentedTransport<T>
where
    T: RoundTrip,
{
    async fn round_trip(&self, request: Request) -> Result<Response, TransportError> {
        let mut request = request;
        self.config.apply_headers(&mut request.headers);

        if let Some(logger) = self.logger {
            logger.request(&format!("URL: {} {}", request.method, request.url));
            logger.request(&format!(
                "Headers:\n{}",
                format_headers(&request.headers, &self.config.sensitive_headers).join("\n")
            ));
            if !request.body.is_empty() {
                let body = std::mem::take(&mut request.body);
                let content_type = content_type(&request.headers).to_owned();
                request.body = logger
                    .log_body(
                        Direction::Outgoing,
                        body,
                        &content_type,
                        self.config.formatter,
                    )
                    .await?;
            }
        }

        let mut response = self.send_with_retries(request).await?;

        if let Some(logger) = self.logger {
            logger.response(&format!("Code: {}", response.status.as_u16()));
            logger.response(&format!(
                "Headers:\n{}",
                format_headers(&response.headers, &self.config.sensitive_headers).join("\n")
            ));
            let body = std::mem::take(&mut response.body);
            let content_type = content_type(&response.headers).to_owned();
            response.body = logger
                .log_body(
                    Direction::Incoming,
                    body,
                    &content_type,
                    self.config.formatter,
                )
                .await?;
        }

        Ok(response)
    }
}
