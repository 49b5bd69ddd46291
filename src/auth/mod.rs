//! EC2-credential authentication against the identity service.
mod response;
mod signature;

use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use http::{
    HeaderValue, Method,
    header::{ACCEPT, CONTENT_TYPE},
};
use url::Url;

use crate::error::{AuthError, TransportError};
use crate::transport::{Request, RoundTrip};

use response::{extract_identity, rejection_message};
use signature::{random_body_hash, sign};

/// Region used in the credential scope when none is configured.
pub const DEFAULT_REGION: &str = "RegionOne";

const SUBJECT_TOKEN_HEADER: &str = "x-subject-token";

/// EC2 access/secret pair plus the identity endpoint. Built once and shared
/// read-only between workers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access: String,
    pub secret: String,
    pub auth_url: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access", &self.access)
            .field("secret", &crate::transport::MASK)
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

/// Outcome of one successful authentication. Tokens expire, so every call
/// produces a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub username: String,
    pub project_name: String,
    pub token_id: String,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<AuthResult, AuthError>;
}

/// Resolves the identity v3 base URL, appending `/v3/` when the auth URL is
/// not already versioned.
///
/// # Errors
///
/// Returns [`AuthError::Endpoint`] when the URL cannot be parsed.
pub fn identity_v3_base(auth_url: &str) -> Result<Url, AuthError> {
    let mut url = Url::parse(auth_url.trim()).map_err(|source| AuthError::Endpoint {
        url: auth_url.to_owned(),
        source,
    })?;
    let path = url.path().trim_end_matches('/').to_owned();
    if path.ends_with("/v3") {
        url.set_path(&format!("{}/", path));
    } else {
        url.set_path(&format!("{}/v3/", path));
    }
    Ok(url)
}

/// Performs one EC2 token exchange.
///
/// # Errors
///
/// Fails with a transport error when the endpoint cannot be reached, with
/// [`AuthError::Rejected`] for non-success statuses, and with a dedicated
/// variant for each missing part of the token response.
pub async fn authenticate<T>(
    transport: &T,
    endpoint: &Url,
    credentials: &Credentials,
    region: &str,
) -> Result<AuthResult, AuthError>
where
    T: RoundTrip + ?Sized,
{
    let document = sign(credentials, region, Utc::now(), random_body_hash());
    let payload = serde_json::to_vec(&document).map_err(|source| AuthError::Encode { source })?;

    let mut request = Request::new(Method::POST, endpoint.clone()).with_body(payload);
    let json = HeaderValue::from_static("application/json");
    request.headers.insert(CONTENT_TYPE, json.clone());
    request.headers.insert(ACCEPT, json);

    let response = transport.round_trip(request).await?;
    let status = response.status;
    let token_id = response
        .headers
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response
        .body
        .collect()
        .await
        .map_err(|source| AuthError::Transport(TransportError::BodyRead { source }))?;

    if !status.is_success() {
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            message: rejection_message(&body),
        });
    }

    let (username, project_name) = extract_identity(&body)?;
    let token_id = token_id
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingTokenId)?;

    Ok(AuthResult {
        username,
        project_name,
        token_id,
    })
}

/// Authenticator bound to one endpoint, credential set and transport.
#[derive(Debug)]
pub struct Ec2TokenClient<T> {
    transport: T,
    endpoint: Url,
    credentials: Credentials,
    region: String,
}

impl<T> Ec2TokenClient<T>
where
    T: RoundTrip,
{
    /// Resolves the `ec2tokens` endpoint from the credentials' auth URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Endpoint`] when the auth URL is invalid.
    pub fn new(transport: T, credentials: Credentials, region: &str) -> Result<Self, AuthError> {
        let base = identity_v3_base(&credentials.auth_url)?;
        let endpoint = base
            .join("ec2tokens")
            .map_err(|source| AuthError::Endpoint {
                url: credentials.auth_url.clone(),
                source,
            })?;
        Ok(Self {
            transport,
            endpoint,
            credentials,
            region: region.to_owned(),
        })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl<T> Authenticator for Ec2TokenClient<T>
where
    T: RoundTrip,
{
    async fn authenticate(&self) -> Result<AuthResult, AuthError> {
        authenticate(
            &self.transport,
            &self.endpoint,
            &self.credentials,
            &self.region,
        )
        .await
    }
}
