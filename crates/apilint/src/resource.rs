//! API definition resource identifiers.
//!
//! A definition is addressed by a resource path of the form
//! `/subscriptions/{s}/resourceGroups/{rg}/providers/Microsoft.ApiCenter/services/{svc}/workspaces/{ws}/apis/{api}/versions/{ver}/definitions/{def}`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Resource provider namespace that owns API definitions.
pub const PROVIDER_NAMESPACE: &str = "Microsoft.ApiCenter";

/// Keyword segments in the order they appear in a definition path.
const KEYWORDS: [&str; 8] = [
    "subscriptions",
    "resourceGroups",
    "providers",
    "services",
    "workspaces",
    "apis",
    "versions",
    "definitions",
];

/// Errors produced while decomposing a resource path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceIdError {
    #[error("resource id is empty")]
    Empty,

    #[error("resource id must start with '/': {0}")]
    NotAbsolute(String),

    #[error("expected segment '{expected}' but found '{found}'")]
    UnexpectedSegment { expected: &'static str, found: String },

    #[error("missing value for '{0}'")]
    MissingValue(&'static str),

    #[error("unsupported provider '{0}' (expected {PROVIDER_NAMESPACE})")]
    UnsupportedProvider(String),

    #[error("unexpected trailing segments: {0}")]
    TrailingSegments(String),
}

/// The named segments of an API definition resource path.
///
/// Every field is non-empty once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinitionResource {
    pub subscription_id: String,
    pub resource_group: String,
    pub service_name: String,
    pub workspace_name: String,
    pub api_name: String,
    pub api_version: String,
    pub api_definition: String,
}

impl ApiDefinitionResource {
    /// Path segments below the management endpoint, in URL order.
    ///
    /// Values are returned raw; callers push them through a URL builder so
    /// they get percent-encoded.
    pub fn path_segments(&self) -> [&str; 16] {
        [
            "subscriptions",
            &self.subscription_id,
            "resourceGroups",
            &self.resource_group,
            "providers",
            PROVIDER_NAMESPACE,
            "services",
            &self.service_name,
            "workspaces",
            &self.workspace_name,
            "apis",
            &self.api_name,
            "versions",
            &self.api_version,
            "definitions",
            &self.api_definition,
        ]
    }
}

impl FromStr for ApiDefinitionResource {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ResourceIdError::Empty);
        }
        let rest = trimmed
            .strip_prefix('/')
            .ok_or_else(|| ResourceIdError::NotAbsolute(trimmed.to_string()))?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let mut segments = rest.split('/');
        let mut values: Vec<&str> = Vec::with_capacity(KEYWORDS.len());

        for keyword in KEYWORDS {
            let found = segments.next().unwrap_or_default();
            if !found.eq_ignore_ascii_case(keyword) {
                return Err(ResourceIdError::UnexpectedSegment {
                    expected: keyword,
                    found: found.to_string(),
                });
            }
            let value = segments
                .next()
                .filter(|v| !v.is_empty())
                .ok_or(ResourceIdError::MissingValue(keyword))?;
            values.push(value);
        }

        let trailing: Vec<&str> = segments.collect();
        if !trailing.is_empty() {
            return Err(ResourceIdError::TrailingSegments(trailing.join("/")));
        }

        if !values[2].eq_ignore_ascii_case(PROVIDER_NAMESPACE) {
            return Err(ResourceIdError::UnsupportedProvider(values[2].to_string()));
        }

        Ok(Self {
            subscription_id: values[0].to_string(),
            resource_group: values[1].to_string(),
            service_name: values[3].to_string(),
            workspace_name: values[4].to_string(),
            api_name: values[5].to_string(),
            api_version: values[6].to_string(),
            api_definition: values[7].to_string(),
        })
    }
}

impl fmt::Display for ApiDefinitionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.path_segments() {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
