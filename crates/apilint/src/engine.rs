//! Linting engine integration.
//!
//! Rule evaluation happens outside this crate. [`LintEngine`] is the seam the
//! pipeline calls through; [`SpectralCli`] drives the Spectral command line.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

use crate::document::ParsedDocument;
use crate::ruleset::Ruleset;

/// Engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to stage document for linting: {0}")]
    Staging(#[source] std::io::Error),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unreadable linter output ({status}): {reason}; stderr: {stderr}")]
    Output {
        status: String,
        reason: String,
        stderr: String,
    },
}

/// Rule identifier as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosticCode {
    Name(String),
    Number(i64),
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Zero-based position in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// One rule violation, in Spectral's JSON result shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    /// 0 = error, 1 = warning, 2 = information, 3 = hint. Passed through unchecked.
    pub severity: i64,
    pub range: Range,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// An external rule-evaluation engine.
pub trait LintEngine: Send + Sync {
    /// Name reported in logs.
    fn name(&self) -> &str;

    /// Lint `document` against `ruleset`, returning diagnostics in engine order.
    fn lint(
        &self,
        document: &ParsedDocument,
        ruleset: &Ruleset,
    ) -> impl Future<Output = Result<Vec<Diagnostic>, EngineError>> + Send;
}

/// Spectral, invoked as `spectral lint --format json`.
#[derive(Debug, Clone)]
pub struct SpectralCli {
    program: PathBuf,
}

impl SpectralCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl LintEngine for SpectralCli {
    fn name(&self) -> &str {
        "spectral"
    }

    async fn lint(
        &self,
        document: &ParsedDocument,
        ruleset: &Ruleset,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        // Spectral picks its parser from the file extension.
        let mut staged = tempfile::Builder::new()
            .prefix("apilint-")
            .suffix(document.format().extension())
            .tempfile()
            .map_err(EngineError::Staging)?;
        staged
            .write_all(document.text().as_bytes())
            .and_then(|_| staged.flush())
            .map_err(EngineError::Staging)?;

        tracing::debug!(
            program = %self.program.display(),
            document = %staged.path().display(),
            ruleset = %ruleset.path().display(),
            "running spectral"
        );

        let output = Command::new(&self.program)
            .arg("lint")
            .arg(staged.path())
            .arg("--ruleset")
            .arg(ruleset.path())
            .args(["--format", "json", "--quiet"])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        // Exit status 1 only means error-severity results were found.
        parse_spectral_output(&output.stdout).map_err(|e| EngineError::Output {
            status: output.status.to_string(),
            reason: e.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Decode the JSON formatter's output. Empty output means no results.
pub fn parse_spectral_output(stdout: &[u8]) -> Result<Vec<Diagnostic>, serde_json::Error> {
    let text = String::from_utf8_lossy(stdout);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;

    const SPECTRAL_JSON: &str = r##"[
      {
        "code": "no-$ref-siblings",
        "path": ["paths", "/pets", "get", "responses", "200"],
        "message": "$ref must not be placed next to any other properties",
        "severity": 1,
        "range": { "start": { "line": 12, "character": 10 }, "end": { "line": 12, "character": 32 } },
        "source": "/tmp/apilint-x.yaml"
      },
      {
        "code": 404,
        "message": "numeric code",
        "severity": 0,
        "range": { "start": { "line": 0, "character": 0 }, "end": { "line": 0, "character": 1 } }
      }
    ]"##;

    #[test]
    fn decode_spectral_results() {
        let diagnostics = parse_spectral_output(SPECTRAL_JSON.as_bytes()).unwrap();
        assert_eq!(diagnostics.len(), 2);

        let first = &diagnostics[0];
        assert_eq!(first.code, DiagnosticCode::Name("no-$ref-siblings".into()));
        assert_eq!(first.severity, 1);
        assert_eq!(first.range.start, Position { line: 12, character: 10 });
        assert_eq!(first.path.len(), 5);
        assert_eq!(first.source.as_deref(), Some("/tmp/apilint-x.yaml"));

        let second = &diagnostics[1];
        assert_eq!(second.code, DiagnosticCode::Number(404));
        assert_eq!(second.code.to_string(), "404");
        assert!(second.path.is_empty());
        assert!(second.source.is_none());
    }

    #[test]
    fn empty_output_means_no_results() {
        assert!(parse_spectral_output(b"").unwrap().is_empty());
        assert!(parse_spectral_output(b"[]\n").unwrap().is_empty());
    }

    #[test]
    fn reject_non_json_output() {
        assert!(parse_spectral_output(b"No results with a severity of 'error' found!").is_err());
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let engine = SpectralCli::new("/nonexistent/spectral");
        let document =
            ParsedDocument::parse("openapi: 3.0.0\n".to_string(), DocumentFormat::Yaml).unwrap();
        let ruleset =
            Ruleset::from_source(PathBuf::from("ruleset.yaml"), "extends: spectral:oas").unwrap();

        let err = engine.lint(&document, &ruleset).await.unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    /// Write an executable stand-in for Spectral. It records its arguments
    /// and the staged document next to itself, then runs `body`.
    #[cfg(unix)]
    fn fake_spectral(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("spectral");
        let record = format!(
            "printf '%s\\n' \"$@\" > '{args}'\ncp \"$2\" '{doc}'\n",
            args = dir.join("args").display(),
            doc = dir.join("document").display(),
        );
        std::fs::write(&script, format!("#!/bin/sh\n{}{}\n", record, body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    fn recorded_args(dir: &std::path::Path) -> Vec<String> {
        std::fs::read_to_string(dir.join("args"))
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_one_with_results_is_success() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = fake_spectral(
            dir.path(),
            &format!("cat <<'EOF'\n{}\nEOF\nexit 1", SPECTRAL_JSON),
        );
        let text = "openapi: 3.0.0\ninfo:\n  title: Pets\n";
        let document = ParsedDocument::parse(text.to_string(), DocumentFormat::Yaml).unwrap();
        let ruleset =
            Ruleset::from_source(dir.path().join("ruleset.yaml"), "extends: spectral:oas").unwrap();

        let diagnostics = SpectralCli::new(&script)
            .lint(&document, &ruleset)
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].code, DiagnosticCode::Name("no-$ref-siblings".into()));

        let args = recorded_args(dir.path());
        assert_eq!(args.len(), 7);
        assert_eq!(args[0], "lint");
        assert!(args[1].ends_with(".yaml"), "staged as {}", args[1]);
        assert_eq!(
            &args[2..],
            [
                "--ruleset".to_string(),
                dir.path().join("ruleset.yaml").display().to_string(),
                "--format".to_string(),
                "json".to_string(),
                "--quiet".to_string(),
            ]
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("document")).unwrap(), text);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn json_document_is_staged_with_json_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = fake_spectral(dir.path(), "echo '[]'");
        let document =
            ParsedDocument::parse(r#"{"openapi":"3.1.0"}"#.to_string(), DocumentFormat::Json)
                .unwrap();
        let ruleset =
            Ruleset::from_source(PathBuf::from("ruleset.yaml"), "extends: spectral:oas").unwrap();

        let diagnostics = SpectralCli::new(&script)
            .lint(&document, &ruleset)
            .await
            .unwrap();
        assert!(diagnostics.is_empty());
        assert!(recorded_args(dir.path())[1].ends_with(".json"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_output_is_output_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = fake_spectral(
            dir.path(),
            "echo 'Error running Spectral!'\necho 'ruleset could not be loaded' >&2\nexit 2",
        );
        let document =
            ParsedDocument::parse("openapi: 3.0.0\n".to_string(), DocumentFormat::Yaml).unwrap();
        let ruleset =
            Ruleset::from_source(PathBuf::from("ruleset.yaml"), "extends: spectral:oas").unwrap();

        let err = SpectralCli::new(&script)
            .lint(&document, &ruleset)
            .await
            .unwrap_err();
        match err {
            EngineError::Output { status, stderr, .. } => {
                assert!(status.contains('2'), "status was {}", status);
                assert_eq!(stderr, "ruleset could not be loaded");
            }
            other => panic!("expected output error, got {:?}", other),
        }
    }
}
