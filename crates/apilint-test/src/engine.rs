//! A lint engine that returns canned diagnostics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use apilint::{Diagnostic, DocumentFormat, EngineError, LintEngine, ParsedDocument, Ruleset};

/// Records what it was asked to lint and answers with fixed diagnostics.
#[derive(Debug, Clone, Default)]
pub struct StubEngine {
    diagnostics: Vec<Diagnostic>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<(DocumentFormat, String)>>>,
}

impl StubEngine {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    /// Build from Spectral JSON output.
    pub fn from_spectral_json(json: &str) -> Self {
        let diagnostics = serde_json::from_str(json).expect("fixture is valid Spectral output");
        Self::new(diagnostics)
    }

    /// How many times `lint` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Format and text of every document linted so far.
    pub fn seen(&self) -> Vec<(DocumentFormat, String)> {
        self.seen.lock().expect("stub engine lock poisoned").clone()
    }
}

impl LintEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    async fn lint(
        &self,
        document: &ParsedDocument,
        _ruleset: &Ruleset,
    ) -> Result<Vec<Diagnostic>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .expect("stub engine lock poisoned")
            .push((document.format(), document.text().to_string()));
        Ok(self.diagnostics.clone())
    }
}
