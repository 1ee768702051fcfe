//! Definition document retrieval.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::client::{ManagementClient, EXPORT_SPECIFICATION};
use crate::error::LintError;
use crate::resource::ApiDefinitionResource;

/// Export formats ending in this suffix carry a URL instead of the document.
pub const LINK_FORMAT_SUFFIX: &str = "-link";

/// Body of an `exportSpecification` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportedSpecification {
    pub format: String,
    pub value: String,
}

impl ExportedSpecification {
    /// Whether `value` is a link to the document rather than the document.
    pub fn is_link(&self) -> bool {
        self.format.ends_with(LINK_FORMAT_SUFFIX)
    }
}

/// Export the definition and return its document text.
///
/// Follows the link when the export hands one back. One attempt per call.
pub async fn fetch_document(
    client: &ManagementClient,
    resource: &ApiDefinitionResource,
) -> Result<String, LintError> {
    let url = client.definition_url(resource, EXPORT_SPECIFICATION)?;
    tracing::info!(url = %url, "exporting definition");

    let response = client
        .post(url)
        .await?
        .send()
        .await
        .map_err(|e| LintError::RemoteFetch(format!("export request failed: {}", e)))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(LintError::RemoteFetch(format!(
            "export returned status {}",
            status.as_u16()
        )));
    }

    let exported: ExportedSpecification = response
        .json()
        .await
        .map_err(|e| LintError::RemoteFetch(format!("malformed export response: {}", e)))?;

    if exported.is_link() {
        tracing::debug!(format = %exported.format, "export returned a link");
        fetch_link(client.http(), &exported.value).await
    } else {
        Ok(exported.value)
    }
}

/// Download the document behind an export link.
///
/// Links are pre-signed, so no bearer token is attached.
pub async fn fetch_link(http: &reqwest::Client, url: &str) -> Result<String, LintError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| LintError::RemoteFetch(format!("failed to fetch file from {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LintError::RemoteFetch(format!(
            "failed to fetch file from {}: status {}",
            url,
            status.as_u16()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| LintError::RemoteFetch(format!("failed to read file from {}: {}", url, e)))
}
