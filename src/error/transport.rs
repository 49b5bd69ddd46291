use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to read body: {source}")]
    BodyRead {
        #[source]
        source: std::io::Error,
    },
    #[error("{source}")]
    Connect {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("Connection error, retries exhausted. Aborting. Last error was: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: Box<TransportError>,
    },
    #[error("Connection error, retry budget of {budget:?} exceeded after {elapsed:?}. Last error was: {source}")]
    RetryBudgetExceeded {
        budget: Duration,
        elapsed: Duration,
        #[source]
        source: Box<TransportError>,
    },
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// Text of the innermost cause, used to group failures by what actually
    /// went wrong on the wire rather than by wrapper.
    #[must_use]
    pub fn root_cause(&self) -> String {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current.to_string()
    }

    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, TransportError::Connect { .. })
    }
}

/// Raised by the JSON body formatter. Never fatal: the caller logs it and
/// shows the raw text instead.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unable to parse JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to re-marshal JSON: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}
