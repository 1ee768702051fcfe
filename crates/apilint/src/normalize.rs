//! Translation of engine diagnostics into the analysis report contract.

use serde::{Deserialize, Serialize};

use crate::engine::{Diagnostic, Position};

/// Analyzer name stamped on every result.
pub const SPECTRAL_ANALYZER: &str = "spectral";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl Severity {
    /// Map Spectral's numeric severity. Unknown values are reported as errors.
    pub fn from_spectral(level: i64) -> Self {
        match level {
            0 => Self::Error,
            1 => Self::Warning,
            2 => Self::Information,
            3 => Self::Hint,
            _ => Self::Error,
        }
    }
}

/// One entry of the uploaded analysis report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub analyzer: String,
    pub description: String,
    pub analyzer_rule_name: String,
    pub severity: Severity,
    /// Always serialized, as `null` when absent.
    pub doc_url: Option<String>,
    pub details: ResultDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDetails {
    pub range: ResultRange,
}

/// `line:character` pairs, zero-based as the engine reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRange {
    pub start: String,
    pub end: String,
}

fn position(pos: &Position) -> String {
    format!("{}:{}", pos.line, pos.character)
}

impl From<&Diagnostic> for ValidationResult {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            analyzer: SPECTRAL_ANALYZER.to_string(),
            description: diagnostic.message.clone(),
            analyzer_rule_name: diagnostic.code.to_string(),
            severity: Severity::from_spectral(diagnostic.severity),
            doc_url: None,
            details: ResultDetails {
                range: ResultRange {
                    start: position(&diagnostic.range.start),
                    end: position(&diagnostic.range.end),
                },
            },
        }
    }
}

/// Normalize diagnostics one-to-one, keeping engine order.
pub fn normalize(diagnostics: &[Diagnostic]) -> Vec<ValidationResult> {
    diagnostics.iter().map(ValidationResult::from).collect()
}
