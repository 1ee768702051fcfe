//! Access tokens for the management plane.
//!
//! Token issuance belongs to the environment. This module only knows where to
//! look: an explicit token, an environment variable, or the managed identity
//! endpoint the Functions host exposes.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Resource the management-plane token is requested for.
pub const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";

/// Environment variable holding a pre-issued bearer token.
pub const ACCESS_TOKEN_ENV: &str = "APILINT_ACCESS_TOKEN";

/// Managed identity endpoint injected by App Service / Functions.
pub const IDENTITY_ENDPOINT_ENV: &str = "IDENTITY_ENDPOINT";

/// Secret header value paired with [`IDENTITY_ENDPOINT_ENV`].
pub const IDENTITY_HEADER_ENV: &str = "IDENTITY_HEADER";

const MANAGED_IDENTITY_API_VERSION: &str = "2019-08-01";

/// Credential resolution errors.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no ambient credential: set {ACCESS_TOKEN_ENV} or run with a managed identity")]
    Unavailable,

    #[error("managed identity request failed: {0}")]
    ManagedIdentity(String),
}

/// Where bearer tokens come from.
#[derive(Clone, Default)]
pub enum Credential {
    /// A fixed token, for local runs and tests.
    Static(String),
    /// A managed identity endpoint with its secret header.
    ManagedIdentity { endpoint: String, header: String },
    /// Resolve from the environment on every call.
    #[default]
    Ambient,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<redacted>)"),
            Self::ManagedIdentity { endpoint, .. } => f
                .debug_struct("ManagedIdentity")
                .field("endpoint", endpoint)
                .finish_non_exhaustive(),
            Self::Ambient => f.write_str("Ambient"),
        }
    }
}

#[derive(Deserialize)]
struct ManagedIdentityToken {
    access_token: String,
}

impl Credential {
    /// Pick the first available source from the process environment.
    pub fn from_env() -> Result<Self, CredentialError> {
        if let Some(token) = std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
        {
            return Ok(Self::Static(token));
        }
        match (
            std::env::var(IDENTITY_ENDPOINT_ENV),
            std::env::var(IDENTITY_HEADER_ENV),
        ) {
            (Ok(endpoint), Ok(header)) if !endpoint.is_empty() => {
                Ok(Self::ManagedIdentity { endpoint, header })
            }
            _ => Err(CredentialError::Unavailable),
        }
    }

    /// Obtain a bearer token for `resource`.
    ///
    /// Tokens are not cached; each invocation asks again.
    pub async fn token(
        &self,
        http: &reqwest::Client,
        resource: &str,
    ) -> Result<String, CredentialError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::ManagedIdentity { endpoint, header } => {
                managed_identity_token(http, endpoint, header, resource).await
            }
            Self::Ambient => match Self::from_env()? {
                Self::Static(token) => Ok(token),
                Self::ManagedIdentity { endpoint, header } => {
                    managed_identity_token(http, &endpoint, &header, resource).await
                }
                Self::Ambient => Err(CredentialError::Unavailable),
            },
        }
    }
}

async fn managed_identity_token(
    http: &reqwest::Client,
    endpoint: &str,
    header: &str,
    resource: &str,
) -> Result<String, CredentialError> {
    let response = http
        .get(endpoint)
        .query(&[
            ("resource", resource),
            ("api-version", MANAGED_IDENTITY_API_VERSION),
        ])
        .header("X-IDENTITY-HEADER", header)
        .send()
        .await
        .map_err(|e| CredentialError::ManagedIdentity(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CredentialError::ManagedIdentity(format!(
            "status {}",
            status.as_u16()
        )));
    }

    let token: ManagedIdentityToken = response
        .json()
        .await
        .map_err(|e| CredentialError::ManagedIdentity(e.to_string()))?;
    Ok(token.access_token)
}
