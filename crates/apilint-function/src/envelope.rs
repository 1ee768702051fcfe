//! Azure Functions custom handler envelopes.
//!
//! The host POSTs `{ "Data": { <binding>: <payload> }, "Metadata": {...} }`
//! and expects `{ "Outputs", "Logs", "ReturnValue" }` back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use apilint::{InvocationReport, LintError};

/// Header carrying the host's invocation id.
pub const INVOCATION_ID_HEADER: &str = "x-azure-functions-invocationid";

/// Binding name of the Event Grid trigger in `function.json`.
pub const EVENT_BINDING: &str = "event";

/// Request body sent by the Functions host. `Metadata` is not read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeRequest {
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl InvokeRequest {
    /// The payload bound as `name`.
    ///
    /// Some host versions deliver trigger payloads as JSON-encoded strings;
    /// those are decoded, anything else is passed through untouched.
    pub fn binding(&self, name: &str) -> Option<Value> {
        match self.data.get(name)? {
            Value::String(s) => {
                Some(serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())))
            }
            other => Some(other.clone()),
        }
    }
}

/// Response body returned to the Functions host.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeResponse {
    pub outputs: Map<String, Value>,
    pub logs: Vec<String>,
    pub return_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvokeResponse {
    pub fn completed(report: &InvocationReport) -> Self {
        Self {
            logs: vec![
                format!("Linted {} ({}, {})", report.resource, report.format, report.kind),
                format!("Uploaded {} result(s)", report.results.len()),
            ],
            ..Self::default()
        }
    }

    pub fn failed(error: &LintError) -> Self {
        Self {
            logs: vec![format!("Linting failed: {}", error)],
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}
