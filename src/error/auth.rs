use thiserror::Error;

use super::TransportError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid identity endpoint '{url}': {source}")]
    Endpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Identity service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Malformed token response: {reason}")]
    MalformedResponse { reason: String },
    #[error("Token response has no user")]
    MissingUser,
    #[error("Token response has no project scope")]
    MissingProject,
    #[error("Token response has no X-Subject-Token header")]
    MissingTokenId,
    #[error("Failed to encode EC2 credentials: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

impl AuthError {
    /// Grouping key for failure tallies: the underlying transport cause when
    /// the network was involved, otherwise a stable label per variant.
    #[must_use]
    pub fn category(&self) -> String {
        match self {
            AuthError::Transport(err) => err.root_cause(),
            AuthError::Endpoint { .. } => "endpoint".to_owned(),
            AuthError::Rejected { status, .. } => format!("rejected ({})", status),
            AuthError::MalformedResponse { .. } => "malformed_response".to_owned(),
            AuthError::MissingUser => "missing_user".to_owned(),
            AuthError::MissingProject => "missing_project".to_owned(),
            AuthError::MissingTokenId => "missing_token_id".to_owned(),
            AuthError::Encode { .. } => "encode".to_owned(),
        }
    }
}
