//! Invocation orchestration.
//!
//! One trigger runs the stages below exactly once, in order:
//!
//! ```text
//! ReceiveTrigger → ValidateTriggerShape → FetchDocument → DetectFormat → ParseDocument
//!   → LoadRuleset → ExecuteLint → NormalizeResults → UploadReport → Complete
//! ```
//!
//! The first failing stage ends the invocation. Nothing is uploaded on failure.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;
use tracing::Instrument;

use apilint_telemetry::{
    log_document_fetched, log_invocation_failed, log_invocation_started, log_lint_completed,
    log_report_uploaded, log_stage_completed,
};

use crate::client::ManagementClient;
use crate::config::LinterConfig;
use crate::contract::{validate_trigger, InputContract};
use crate::document::{DocumentFormat, ParsedDocument, SpecKind};
use crate::engine::LintEngine;
use crate::error::LintError;
use crate::fetch::fetch_document;
use crate::normalize::{normalize, ValidationResult};
use crate::resource::ApiDefinitionResource;
use crate::ruleset::Ruleset;
use crate::upload::upload_report;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReceiveTrigger,
    ValidateTriggerShape,
    FetchDocument,
    DetectFormat,
    ParseDocument,
    LoadRuleset,
    ExecuteLint,
    NormalizeResults,
    UploadReport,
    Complete,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReceiveTrigger => "receive_trigger",
            Self::ValidateTriggerShape => "validate_trigger_shape",
            Self::FetchDocument => "fetch_document",
            Self::DetectFormat => "detect_format",
            Self::ParseDocument => "parse_document",
            Self::LoadRuleset => "load_ruleset",
            Self::ExecuteLint => "execute_lint",
            Self::NormalizeResults => "normalize_results",
            Self::UploadReport => "upload_report",
            Self::Complete => "complete",
        }
    }

    /// The stage that follows this one. `Complete` is terminal.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::ReceiveTrigger => Some(Self::ValidateTriggerShape),
            Self::ValidateTriggerShape => Some(Self::FetchDocument),
            Self::FetchDocument => Some(Self::DetectFormat),
            Self::DetectFormat => Some(Self::ParseDocument),
            Self::ParseDocument => Some(Self::LoadRuleset),
            Self::LoadRuleset => Some(Self::ExecuteLint),
            Self::ExecuteLint => Some(Self::NormalizeResults),
            Self::NormalizeResults => Some(Self::UploadReport),
            Self::UploadReport => Some(Self::Complete),
            Self::Complete => None,
        }
    }
}

/// Tracks the current stage; only moves forward.
struct Progress {
    stage: Stage,
    entered: Instant,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: Stage::ReceiveTrigger,
            entered: Instant::now(),
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            log_stage_completed!(
                stage = self.stage.as_str(),
                elapsed_ms = self.entered.elapsed().as_millis() as u64,
                "stage completed"
            );
            self.stage = next;
            self.entered = Instant::now();
        }
    }
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone)]
pub struct InvocationReport {
    pub contract: InputContract,
    pub resource: ApiDefinitionResource,
    pub format: DocumentFormat,
    pub kind: SpecKind,
    pub results: Vec<ValidationResult>,
}

/// Runs trigger → report for one definition at a time.
///
/// Holds no per-invocation state, so one instance serves concurrent triggers.
#[derive(Debug, Clone)]
pub struct Pipeline<E> {
    client: ManagementClient,
    ruleset_path: PathBuf,
    engine: E,
}

impl<E: LintEngine> Pipeline<E> {
    pub fn new(config: &LinterConfig, engine: E) -> Result<Self, LintError> {
        Ok(Self::with_client(
            ManagementClient::new(config)?,
            config.ruleset_path.clone(),
            engine,
        ))
    }

    pub fn with_client(client: ManagementClient, ruleset_path: PathBuf, engine: E) -> Self {
        Self {
            client,
            ruleset_path,
            engine,
        }
    }

    /// Run one invocation for `event`, the raw trigger payload.
    pub async fn run(
        &self,
        invocation_id: &str,
        event: Option<&Value>,
    ) -> Result<InvocationReport, LintError> {
        let span = tracing::info_span!("invocation", invocation_id = %invocation_id);
        async {
            let mut progress = Progress::new();
            let result = self.execute(event, &mut progress).await;
            if let Err(e) = &result {
                log_invocation_failed!(
                    stage = progress.stage.as_str(),
                    error = %e,
                    "invocation failed"
                );
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        event: Option<&Value>,
        progress: &mut Progress,
    ) -> Result<InvocationReport, LintError> {
        progress.advance();
        let trigger = validate_trigger(event)?;
        let resource = trigger.resource;
        log_invocation_started!(
            resource = %resource,
            title = %trigger.contract.title,
            specification = %trigger.contract.specification.name,
            specification_version = %trigger.contract.specification.version,
            "linting definition"
        );

        progress.advance();
        let text = fetch_document(&self.client, &resource).await?;
        log_document_fetched!(bytes = text.len(), "definition fetched");

        progress.advance();
        let format = DocumentFormat::sniff(&text);

        progress.advance();
        let document = ParsedDocument::parse(text, format)?;
        tracing::info!(format = %format, kind = %document.kind(), "parsed definition");

        progress.advance();
        let ruleset = Ruleset::load(&self.ruleset_path).await?;
        tracing::debug!(
            ruleset = %ruleset.path().display(),
            extends = ?ruleset.extends(),
            rules = ruleset.rule_count(),
            "ruleset loaded"
        );

        progress.advance();
        let diagnostics = self.engine.lint(&document, &ruleset).await?;
        log_lint_completed!(
            engine = self.engine.name(),
            diagnostics = diagnostics.len(),
            "lint completed"
        );

        progress.advance();
        let results = normalize(&diagnostics);

        progress.advance();
        upload_report(&self.client, &resource, &results).await?;
        log_report_uploaded!(results = results.len(), "analysis report uploaded");

        progress.advance();
        Ok(InvocationReport {
            contract: trigger.contract,
            resource,
            format,
            kind: document.kind().clone(),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_form_a_single_chain() {
        let mut stage = Stage::ReceiveTrigger;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited.len(), 10);
        assert_eq!(visited.last(), Some(&Stage::Complete));
    }

    #[test]
    fn progress_stops_at_complete() {
        let mut progress = Progress::new();
        for _ in 0..20 {
            progress.advance();
        }
        assert_eq!(progress.stage, Stage::Complete);
    }

    #[test]
    fn stage_names_are_unique() {
        let mut names = Vec::new();
        let mut stage = Some(Stage::ReceiveTrigger);
        while let Some(s) = stage {
            names.push(s.as_str());
            stage = s.next();
        }
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }
}
