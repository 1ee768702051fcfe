//! Format sniffing and document loading.
//!
//! The linting engine does the real parsing. Loading the document here only
//! guarantees the engine receives text in the format it is told to expect,
//! and records whether it looks like OpenAPI or AsyncAPI for the logs.

use std::fmt;

use serde::de::IgnoredAny;
use serde_json::Value;
use thiserror::Error;

/// Errors produced while loading a document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Document was sniffed as JSON but failed to load.
    #[error("failed to parse spec file as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Document failed to load as YAML.
    #[error("failed to parse spec file as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serialization of the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Classify `text`: JSON if it parses as JSON, YAML otherwise.
    ///
    /// Any valid JSON text counts, including a bare scalar like `42`.
    pub fn sniff(text: &str) -> Self {
        if serde_json::from_str::<IgnoredAny>(text).is_ok() {
            Self::Json
        } else {
            Self::Yaml
        }
    }

    /// File extension the engine expects for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => ".json",
            Self::Yaml => ".yaml",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specification family declared at the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecKind {
    OpenApi(String),
    Swagger(String),
    AsyncApi(String),
    Unknown,
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenApi(v) => write!(f, "openapi {}", v),
            Self::Swagger(v) => write!(f, "swagger {}", v),
            Self::AsyncApi(v) => write!(f, "asyncapi {}", v),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// A loaded definition document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    text: String,
    format: DocumentFormat,
    kind: SpecKind,
}

impl ParsedDocument {
    /// Load `text` as `format`. The parsed tree is only inspected for its
    /// version marker; the engine reads the original text.
    pub fn parse(text: String, format: DocumentFormat) -> Result<Self, ParseError> {
        let root: Value = match format {
            DocumentFormat::Json => serde_json::from_str(&text)?,
            DocumentFormat::Yaml => serde_yaml::from_str(&text)?,
        };
        let kind = detect_kind(&root);

        Ok(Self { text, format, kind })
    }

    /// The original document text, as handed to the engine.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn kind(&self) -> &SpecKind {
        &self.kind
    }
}

/// Read the version marker from the document root.
fn detect_kind(root: &Value) -> SpecKind {
    let Some(obj) = root.as_object() else {
        return SpecKind::Unknown;
    };

    let version = |key: &str| -> Option<String> {
        obj.get(key).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };

    if let Some(v) = version("openapi") {
        SpecKind::OpenApi(v)
    } else if let Some(v) = version("asyncapi") {
        SpecKind::AsyncApi(v)
    } else if let Some(v) = version("swagger") {
        SpecKind::Swagger(v)
    } else {
        SpecKind::Unknown
    }
}
