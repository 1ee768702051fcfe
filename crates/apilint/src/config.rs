//! Pipeline configuration.

use std::path::PathBuf;

use crate::credential::Credential;

/// Management plane the definitions live in.
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// `api-version` sent with export and report calls.
pub const DEFAULT_API_VERSION: &str = "2024-06-01-preview";

/// Ruleset packaged next to the deployable, relative to its root.
pub const DEFAULT_RULESET_PATH: &str = "resources/rulesets/spectral.yaml";

/// Spectral executable looked up on `PATH`.
pub const DEFAULT_SPECTRAL_BIN: &str = "spectral";

/// Configuration for a [`crate::Pipeline`].
#[derive(Debug, Clone)]
pub struct LinterConfig {
    /// Base URL of the management plane (default: management.azure.com).
    pub management_endpoint: String,

    /// `api-version` query parameter for management calls.
    pub api_version: String,

    /// Location of the packaged ruleset.
    pub ruleset_path: PathBuf,

    /// Spectral executable used by [`crate::SpectralCli`].
    pub spectral_bin: PathBuf,

    /// Source of bearer tokens for management calls.
    pub credential: Credential,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            management_endpoint: DEFAULT_MANAGEMENT_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            ruleset_path: PathBuf::from(DEFAULT_RULESET_PATH),
            spectral_bin: PathBuf::from(DEFAULT_SPECTRAL_BIN),
            credential: Credential::Ambient,
        }
    }
}

impl LinterConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the management endpoint.
    pub fn with_management_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.management_endpoint = endpoint.into();
        self
    }

    /// Set the management `api-version`.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the ruleset location.
    pub fn with_ruleset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ruleset_path = path.into();
        self
    }

    /// Set the Spectral executable.
    pub fn with_spectral_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.spectral_bin = bin.into();
        self
    }

    /// Set the credential source.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }
}
