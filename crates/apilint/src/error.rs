use thiserror::Error;

use crate::credential::CredentialError;
use crate::document::ParseError;
use crate::engine::EngineError;
use crate::ruleset::RulesetError;

/// Errors that end a lint invocation.
///
/// None of these are retried locally; the host decides what happens next.
#[derive(Debug, Error)]
pub enum LintError {
    /// The trigger payload is absent or does not carry exactly one usable resource.
    #[error("invalid trigger payload: {0}")]
    TriggerShape(String),

    /// Exporting the definition or following its link failed.
    #[error("failed to fetch definition: {0}")]
    RemoteFetch(String),

    /// The document is neither valid JSON nor valid YAML.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The packaged ruleset could not be loaded.
    #[error(transparent)]
    Ruleset(#[from] RulesetError),

    /// The linting engine failed to run or produced unreadable output.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// No access token could be obtained for the management plane.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The analysis report was not accepted.
    #[error("failed to upload results: {0}")]
    Upload(String),

    /// The configured management endpoint cannot address a definition.
    #[error("invalid management endpoint: {0}")]
    InvalidEndpoint(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
