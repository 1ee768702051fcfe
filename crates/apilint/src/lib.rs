//! Lint pipeline for API Center definitions.
//!
//! Receives a definition-change trigger, fetches the definition document,
//! runs it through an external linting engine against a packaged ruleset,
//! normalizes the diagnostics and uploads them as an analysis report.
//!
//! Every stage runs once, in order, and the first failure ends the invocation.

pub mod client;
pub mod config;
pub mod contract;
pub mod credential;
pub mod document;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod resource;
pub mod ruleset;
pub mod upload;

pub use client::ManagementClient;
pub use config::LinterConfig;
pub use contract::{validate_trigger, InputContract, ValidatedTrigger};
pub use credential::{Credential, CredentialError};
pub use document::{DocumentFormat, ParseError, ParsedDocument, SpecKind};
pub use engine::{Diagnostic, DiagnosticCode, EngineError, LintEngine, SpectralCli};
pub use error::LintError;
pub use normalize::{normalize, Severity, ValidationResult};
pub use pipeline::{InvocationReport, Pipeline, Stage};
pub use resource::{ApiDefinitionResource, ResourceIdError};
pub use ruleset::{Ruleset, RulesetError};
pub use upload::AnalysisReport;
