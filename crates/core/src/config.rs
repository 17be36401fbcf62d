//! Configuration for the evaluation tooling
//!
//! Configuration can be loaded from TOML files and/or environment
//! variables. Environment variables are prefixed with `COURSERAG_` and use
//! double underscores for nested values, e.g.
//! `COURSERAG_API__BASE_URL=http://localhost:8000`.

use crate::error::{Error, Result};
use config::{Config as ConfigLib, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_k() -> usize {
    5
}

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.courserag/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".courserag").join("config.toml"))
}

/// Retrieval API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the courserag API service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout for a single retrieval call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Evaluation run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Number of documents retrieved per query when no explicit k is given
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Skip cases whose retrieval call fails instead of aborting the run
    #[serde(default)]
    pub skip_failures: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            skip_failures: false,
        }
    }
}

/// Main configuration structure for the evaluation tooling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Retrieval API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Evaluation run configuration
    #[serde(default)]
    pub eval: EvalConfig,
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        // Config crate does not apply serde defaults for missing sections
        builder = builder
            .set_default("api.base_url", default_base_url())
            .map_err(|e| Error::config(format!("Failed to set api.base_url default: {e}")))?;
        builder = builder
            .set_default("api.timeout_secs", default_timeout_secs() as i64)
            .map_err(|e| Error::config(format!("Failed to set api.timeout_secs default: {e}")))?;
        builder = builder
            .set_default("eval.default_k", default_k() as i64)
            .map_err(|e| Error::config(format!("Failed to set eval.default_k default: {e}")))?;
        builder = builder
            .set_default("eval.skip_failures", false)
            .map_err(|e| Error::config(format!("Failed to set eval.skip_failures default: {e}")))?;

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("COURSERAG")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.courserag/config.toml or custom --config path)
    /// 3. Environment variables (COURSERAG_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }

    /// Validates configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::config("api.base_url must not be empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::config("api.timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}
