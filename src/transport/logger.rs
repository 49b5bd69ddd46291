use tracing::{debug, warn};

use crate::error::TransportError;

use super::body::Body;
use super::redact::BodyFormatter;

/// Which way a logged item travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    const fn prefix(self) -> &'static str {
        match self {
            Direction::Outgoing => "->",
            Direction::Incoming => "<-",
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Direction::Outgoing => "request",
            Direction::Incoming => "response",
        }
    }
}

/// Writes HTTP traffic to the `ec2auth::traffic` target at debug level,
/// one log event per text line.
///
/// Transports hold an `Option<TrafficLogger>`; `None` skips every logging
/// step, including body buffering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficLogger;

impl TrafficLogger {
    pub fn log(self, direction: Direction, text: &str) {
        for line in text.split('\n') {
            debug!(target: "ec2auth::traffic", "{} {}", direction.prefix(), line);
        }
    }

    pub fn request(self, text: &str) {
        self.log(Direction::Outgoing, text);
    }

    pub fn response(self, text: &str) {
        self.log(Direction::Incoming, text);
    }

    /// Logs a body and hands back something the caller can still send or
    /// read.
    ///
    /// Intercepted bodies are drained into memory, rendered with `formatter`
    /// and returned as a `Full` body over the original bytes. Anything else is
    /// passed through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BodyRead`] when draining the body fails.
    pub async fn log_body(
        self,
        direction: Direction,
        body: Body,
        content_type: &str,
        formatter: BodyFormatter,
    ) -> Result<Body, TransportError> {
        if !intercepts(direction, content_type) {
            self.log(
                direction,
                &format!(
                    "Not logging because {} body isn't JSON",
                    direction.noun()
                ),
            );
            return Ok(body);
        }

        let raw = body
            .collect()
            .await
            .map_err(|source| TransportError::BodyRead { source })?;

        let formatted = formatter(&raw);
        if let Some(err) = formatted.error.as_ref() {
            warn!("Failed to format {} body: {}", direction.noun(), err);
            self.log(direction, &err.to_string());
        }
        let skip_blank = direction == Direction::Incoming && formatted.text.trim().is_empty();
        if !skip_blank {
            self.log(direction, &format!("Body: {}", formatted.text));
        }

        Ok(Body::from(raw))
    }
}

fn intercepts(direction: Direction, content_type: &str) -> bool {
    let content_type = content_type.trim();
    match direction {
        Direction::Outgoing => {
            content_type.starts_with("application/json")
                || (content_type.starts_with("application/")
                    && content_type.ends_with("-json-patch"))
        }
        Direction::Incoming => content_type.starts_with("application/json"),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use bytes::Bytes;
    use futures_util::stream;

    use super::*;
    use crate::test_support::{capture_logs, run_async_test};
    use crate::transport::format_json;

    #[test]
    fn request_content_types() -> Result<(), String> {
        let cases = [
            ("application/json", true),
            ("application/json; charset=utf-8", true),
            ("application/merge-json-patch", true),
            ("application/openstack-images-v2.1-json-patch", true),
            ("text/plain", false),
            ("application/xml", false),
            ("", false),
        ];
        for (content_type, expected) in cases {
            if intercepts(Direction::Outgoing, content_type) != expected {
                return Err(format!("request '{}' expected {}", content_type, expected));
            }
        }
        if intercepts(Direction::Incoming, "application/merge-json-patch") {
            return Err("responses only intercept application/json".to_owned());
        }
        Ok(())
    }

    #[test]
    fn intercepted_stream_is_rebuilt_with_original_bytes() -> Result<(), String> {
        let logs = capture_logs();
        run_async_test(async {
            let chunks = vec![
                Ok(Bytes::from_static(b"{\"auth\":{\"token\":")),
                Ok(Bytes::from_static(b"{\"id\":\"secret-token\"}}}")),
            ];
            let body = Body::from_stream(stream::iter(chunks));
            let rebuilt = TrafficLogger
                .log_body(Direction::Outgoing, body, "application/json", format_json)
                .await
                .map_err(|err| err.to_string())?;
            let bytes = rebuilt.collect().await.map_err(|err| err.to_string())?;
            if bytes.as_ref() != b"{\"auth\":{\"token\":{\"id\":\"secret-token\"}}}" {
                return Err(format!("body changed: {:?}", bytes));
            }
            Ok(())
        })?;
        let lines = logs.lines();
        if lines.iter().any(|line| line.contains("secret-token")) {
            return Err(format!("token leaked into logs: {:?}", lines));
        }
        if !lines.iter().any(|line| line.ends_with("-> Body: {")) {
            return Err(format!("expected body header line: {:?}", lines));
        }
        if !lines.iter().any(|line| line.contains("->       \"id\": \"***\"")) {
            return Err(format!("expected every line prefixed: {:?}", lines));
        }
        Ok(())
    }

    #[test]
    fn non_json_body_passes_through() -> Result<(), String> {
        let logs = capture_logs();
        run_async_test(async {
            let body = Body::from("plain text");
            let passed = TrafficLogger
                .log_body(Direction::Incoming, body, "text/plain", format_json)
                .await
                .map_err(|err| err.to_string())?;
            if !matches!(passed, Body::Full(ref bytes) if bytes.as_ref() == b"plain text") {
                return Err(format!("unexpected body: {:?}", passed));
            }
            Ok(())
        })?;
        let lines = logs.lines();
        if !lines
            .iter()
            .any(|line| line.ends_with("<- Not logging because response body isn't JSON"))
        {
            return Err(format!("missing notice: {:?}", lines));
        }
        Ok(())
    }

    #[test]
    fn malformed_body_is_logged_raw() -> Result<(), String> {
        let logs = capture_logs();
        run_async_test(async {
            let body = Body::from("{not json");
            let rebuilt = TrafficLogger
                .log_body(Direction::Incoming, body, "application/json", format_json)
                .await
                .map_err(|err| err.to_string())?;
            let bytes = rebuilt.collect().await.map_err(|err| err.to_string())?;
            if bytes.as_ref() != b"{not json" {
                return Err("body changed".to_owned());
            }
            Ok(())
        })?;
        let lines = logs.lines();
        if !lines.iter().any(|line| line.ends_with("<- Body: {not json")) {
            return Err(format!("raw body missing: {:?}", lines));
        }
        if !lines.iter().any(|line| line.contains("unable to parse JSON")) {
            return Err(format!("parse error missing: {:?}", lines));
        }
        Ok(())
    }

    #[test]
    fn blank_response_body_is_not_logged() -> Result<(), String> {
        let logs = capture_logs();
        run_async_test(async {
            TrafficLogger
                .log_body(Direction::Incoming, Body::Empty, "application/json", |_| {
                    crate::transport::Formatted {
                        text: String::new(),
                        raw: None,
                        error: None,
                    }
                })
                .await
                .map_err(|err| err.to_string())?;
            Ok(())
        })?;
        if logs.lines().iter().any(|line| line.contains("Body:")) {
            return Err("blank body should be skipped".to_owned());
        }
        Ok(())
    }

    #[test]
    fn read_failure_aborts() -> Result<(), String> {
        run_async_test(async {
            let chunks = vec![
                Ok(Bytes::from_static(b"{")),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            ];
            let body = Body::from_stream(stream::iter(chunks));
            match TrafficLogger
                .log_body(Direction::Outgoing, body, "application/json", format_json)
                .await
            {
                Err(TransportError::BodyRead { .. }) => Ok(()),
                other => Err(format!("expected body read error, got {:?}", other)),
            }
        })
    }
}
