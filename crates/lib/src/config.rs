//! TOML configuration.
//!
//! ```toml
//! action_timeout_secs = 600
//! verify = true
//! policy = "abort"
//!
//! [catalog.jq]
//! apt = "jq"
//! ```
//!
//! Every key is optional. Catalog tables are merged over the built-in catalog.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::execute::ExecuteConfig;
use crate::platform::paths;
use crate::resolve::IssueDecision;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("invalid config {path}: {reason}")]
  Invalid { path: PathBuf, reason: String },
}

/// User configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Upper bound in seconds for each prepare/install action.
  pub action_timeout_secs: Option<u64>,
  /// Skip installs whose verification reports the ingredient present.
  pub verify: bool,
  /// What to do when the build is not fully satisfiable.
  pub policy: IssueDecision,
  /// Extra catalog entries.
  pub catalog: Catalog,
}

impl Config {
  /// Parse configuration from TOML text.
  pub fn from_toml(source: &str, path: &Path) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(source).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    if config.action_timeout_secs == Some(0) {
      return Err(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: "action_timeout_secs must be at least 1 (omit it for no timeout)".to_string(),
      });
    }
    Ok(config)
  }

  /// Load the file at `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::from_toml(&source, path)?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  /// Load the file at `path`, or the defaults when it does not exist.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      debug!(path = %path.display(), "no config file, using defaults");
      return Ok(Self::default());
    }
    Self::load(path)
  }

  /// Load from `$SOUS_CONFIG` or the user config directory.
  pub fn discover() -> Result<Self, ConfigError> {
    Self::load_or_default(&paths::config_file())
  }

  pub fn execute_config(&self) -> ExecuteConfig {
    ExecuteConfig {
      action_timeout: self.action_timeout_secs.map(Duration::from_secs),
      verify: self.verify,
    }
  }

  /// The built-in catalog with this config's entries merged in.
  pub fn catalog(&self) -> Catalog {
    let mut catalog = Catalog::builtin();
    catalog.merge(self.catalog.clone());
    catalog
  }
}
