//! HTTP access to the management plane.

use reqwest::{Client, RequestBuilder, Url};

use crate::config::LinterConfig;
use crate::credential::{Credential, MANAGEMENT_RESOURCE};
use crate::error::LintError;
use crate::resource::ApiDefinitionResource;

/// Definition action that returns the specification document.
pub const EXPORT_SPECIFICATION: &str = "exportSpecification";

/// Definition action that stores lint results.
pub const ANALYSIS_REPORT: &str = "analysisReport";

/// Management-plane client for definition actions.
///
/// Wraps a pooled `reqwest::Client`; link follows reuse the same pool.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    http: Client,
    endpoint: Url,
    api_version: String,
    credential: Credential,
}

impl ManagementClient {
    /// Build a client with a fresh connection pool.
    pub fn new(config: &LinterConfig) -> Result<Self, LintError> {
        let http = Client::builder()
            .user_agent(concat!("apilint/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LintError::Client)?;
        Self::with_http(http, config)
    }

    /// Build a client on top of an existing `reqwest::Client`.
    pub fn with_http(http: Client, config: &LinterConfig) -> Result<Self, LintError> {
        let endpoint = Url::parse(&config.management_endpoint).map_err(|e| {
            LintError::InvalidEndpoint(format!("{}: {}", config.management_endpoint, e))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(LintError::InvalidEndpoint(config.management_endpoint.clone()));
        }

        Ok(Self {
            http,
            endpoint,
            api_version: config.api_version.clone(),
            credential: config.credential.clone(),
        })
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// URL of `action` on the given definition, with `api-version` applied.
    pub fn definition_url(
        &self,
        resource: &ApiDefinitionResource,
        action: &str,
    ) -> Result<Url, LintError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| LintError::InvalidEndpoint(self.endpoint.to_string()))?;
            segments
                .pop_if_empty()
                .extend(resource.path_segments())
                .push(action);
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    /// Start an authenticated POST to `url`.
    pub async fn post(&self, url: Url) -> Result<RequestBuilder, LintError> {
        let token = self.credential.token(&self.http, MANAGEMENT_RESOURCE).await?;
        Ok(self.http.post(url).bearer_auth(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource() -> ApiDefinitionResource {
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ApiCenter/services/svc/workspaces/default/apis/echo/versions/v1/definitions/def"
            .parse()
            .unwrap()
    }

    fn client(endpoint: &str) -> ManagementClient {
        let config = LinterConfig::new()
            .with_management_endpoint(endpoint)
            .with_api_version("2024-03-01");
        ManagementClient::with_http(Client::new(), &config).unwrap()
    }

    #[test]
    fn export_url_from_default_endpoint() {
        let url = client("https://management.azure.com")
            .definition_url(&resource(), EXPORT_SPECIFICATION)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ApiCenter/services/svc/workspaces/default/apis/echo/versions/v1/definitions/def/exportSpecification?api-version=2024-03-01"
        );
    }

    #[test]
    fn report_url_keeps_endpoint_prefix() {
        let url = client("http://127.0.0.1:8000/mgmt/")
            .definition_url(&resource(), ANALYSIS_REPORT)
            .unwrap();
        assert_eq!(
            url.path(),
            "/mgmt/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ApiCenter/services/svc/workspaces/default/apis/echo/versions/v1/definitions/def/analysisReport"
        );
        assert_eq!(url.query(), Some("api-version=2024-03-01"));
    }

    #[test]
    fn segment_values_are_escaped() {
        let mut resource = resource();
        resource.api_name = "pet store".into();
        let url = client("https://management.azure.com")
            .definition_url(&resource, EXPORT_SPECIFICATION)
            .unwrap();
        assert!(url.path().contains("/apis/pet%20store/"));
    }

    #[test]
    fn reject_unusable_endpoint() {
        let config = LinterConfig::new().with_management_endpoint("not a url");
        let err = ManagementClient::with_http(Client::new(), &config).unwrap_err();
        assert!(matches!(err, LintError::InvalidEndpoint(_)));

        let config = LinterConfig::new().with_management_endpoint("mailto:ops@example.com");
        let err = ManagementClient::with_http(Client::new(), &config).unwrap_err();
        assert!(matches!(err, LintError::InvalidEndpoint(_)));
    }
}
