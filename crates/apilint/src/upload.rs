//! Analysis report submission.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::{ManagementClient, ANALYSIS_REPORT};
use crate::error::LintError;
use crate::normalize::ValidationResult;
use crate::resource::ApiDefinitionResource;

/// Report body format: the results travel as an embedded JSON string.
pub const INLINE_FORMAT: &str = "inline";

/// Body of an `analysisReport` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub format: String,
    pub value: String,
}

impl AnalysisReport {
    /// Wrap `results` as an inline report.
    pub fn inline(results: &[ValidationResult]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            format: INLINE_FORMAT.to_string(),
            value: serde_json::to_string(results)?,
        })
    }
}

/// Post `results` as the definition's analysis report.
///
/// Anything but `200 OK` is a failure; nothing is retried.
pub async fn upload_report(
    client: &ManagementClient,
    resource: &ApiDefinitionResource,
    results: &[ValidationResult],
) -> Result<(), LintError> {
    let report = AnalysisReport::inline(results)
        .map_err(|e| LintError::Upload(format!("failed to serialize results: {}", e)))?;
    let url = client.definition_url(resource, ANALYSIS_REPORT)?;
    tracing::debug!(url = %url, results = results.len(), "uploading analysis report");

    let response = client
        .post(url)
        .await?
        .json(&report)
        .send()
        .await
        .map_err(|e| LintError::Upload(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(LintError::Upload(format!(
            "Status code: {}",
            status.as_u16()
        )));
    }
    Ok(())
}
