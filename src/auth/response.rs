use serde::Deserialize;

use crate::error::AuthError;

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    user: Option<NamedRef>,
    project: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    title: Option<String>,
}

/// User and project names from a token document.
pub(crate) fn extract_identity(body: &[u8]) -> Result<(String, String), AuthError> {
    let envelope: TokenEnvelope =
        serde_json::from_slice(body).map_err(|err| AuthError::MalformedResponse {
            reason: err.to_string(),
        })?;
    let username = envelope
        .token
        .user
        .and_then(|user| user.name)
        .ok_or(AuthError::MissingUser)?;
    let project = envelope
        .token
        .project
        .and_then(|project| project.name)
        .ok_or(AuthError::MissingProject)?;
    Ok((username, project))
}

/// Best description of a rejected call: the identity service error message,
/// then its title, then the raw body.
pub(crate) fn rejection_message(body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body)
        && let Some(message) = envelope.error.message.or(envelope.error.title)
    {
        return message;
    }
    String::from_utf8_lossy(body).trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_user_and_project() -> Result<(), String> {
        let body = br#"{"token":{"user":{"id":"u1","name":"alice"},"project":{"id":"p1","name":"demo"}}}"#;
        let (user, project) = extract_identity(body).map_err(|err| err.to_string())?;
        if user != "alice" || project != "demo" {
            return Err(format!("unexpected identity {} {}", user, project));
        }
        Ok(())
    }

    #[test]
    fn missing_parts_are_distinct_errors() -> Result<(), String> {
        match extract_identity(br#"{"token":{"project":{"name":"demo"}}}"#) {
            Err(AuthError::MissingUser) => {}
            other => return Err(format!("expected missing user, got {:?}", other)),
        }
        match extract_identity(br#"{"token":{"user":{"name":"alice"}}}"#) {
            Err(AuthError::MissingProject) => {}
            other => return Err(format!("expected missing project, got {:?}", other)),
        }
        match extract_identity(b"<html>") {
            Err(AuthError::MalformedResponse { .. }) => Ok(()),
            other => Err(format!("expected malformed response, got {:?}", other)),
        }
    }

    #[test]
    fn rejection_prefers_service_message() -> Result<(), String> {
        let message = rejection_message(
            br#"{"error":{"code":401,"message":"The request you have made requires authentication.","title":"Unauthorized"}}"#,
        );
        if message != "The request you have made requires authentication." {
            return Err(format!("unexpected message: {}", message));
        }
        if rejection_message(b" gateway timeout \n") != "gateway timeout" {
            return Err("expected raw body fallback".to_owned());
        }
        Ok(())
    }
}
