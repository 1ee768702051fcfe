//! The packaged lint ruleset.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Ruleset loading errors.
#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("failed to read ruleset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ruleset {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// A Spectral ruleset file on disk.
///
/// Only the outline is read here; rule evaluation is left to the engine.
#[derive(Debug, Clone)]
pub struct Ruleset {
    path: PathBuf,
    extends: Vec<String>,
    rule_count: usize,
}

impl Ruleset {
    /// Read and sanity-check the ruleset at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RulesetError> {
        let path = path.as_ref().to_path_buf();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| RulesetError::Io {
                path: path.clone(),
                source,
            })?;
        Self::from_source(path, &content)
    }

    /// Check ruleset `content` that was read from `path`.
    pub fn from_source(path: PathBuf, content: &str) -> Result<Self, RulesetError> {
        let invalid = |reason: String| RulesetError::Invalid {
            path: path.clone(),
            reason,
        };

        let root: Value = serde_yaml::from_str(content).map_err(|e| invalid(e.to_string()))?;
        let obj = root
            .as_object()
            .ok_or_else(|| invalid("root must be a mapping".into()))?;

        if !obj.contains_key("extends") && !obj.contains_key("rules") {
            return Err(invalid("must declare 'extends' or 'rules'".into()));
        }

        let extends = obj.get("extends").map(parse_extends).unwrap_or_default();
        let rule_count = obj
            .get("rules")
            .and_then(|v| v.as_object())
            .map(|rules| rules.len())
            .unwrap_or(0);

        Ok(Self {
            path,
            extends,
            rule_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rulesets this one builds on, e.g. `spectral:oas`.
    pub fn extends(&self) -> &[String] {
        &self.extends
    }

    /// Number of rules declared locally (not counting `extends`).
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }
}

/// `extends` is a name, a list of names, or a list of `[name, mode]` pairs.
fn parse_extends(value: &Value) -> Vec<String> {
    match value {
        Value::String(name) => vec![name.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name.clone()),
                Value::Array(pair) => pair.first().and_then(|v| v.as_str()).map(String::from),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
