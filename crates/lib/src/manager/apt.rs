//! `apt-get` backend.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::ingredient::{IngredientVersion, Options};

use super::PackageManager;
use super::command::{parse_version, run_command};
use super::types::ManagerError;

static VERSION_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"apt (\d+\.\d+(?:\.\d+)?)").expect("apt version pattern is valid"));

/// Installs Debian packages with `apt-get`.
#[derive(Debug, Clone)]
pub struct AptManager {
  program: String,
}

impl AptManager {
  pub fn new() -> Self {
    Self::with_program("apt-get")
  }

  /// Use a different executable, e.g. a wrapper script.
  pub fn with_program(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  fn env() -> BTreeMap<String, String> {
    BTreeMap::from([("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())])
  }

  fn install_args(target: &str, version: Option<&str>) -> Vec<String> {
    let pinned = version
      .and_then(|v| v.parse::<IngredientVersion>().ok())
      .and_then(|v| v.exact());
    let package = match pinned {
      Some(version) => format!("{}={}", target, version),
      None => {
        if let Some(version) = version {
          debug!(package = %target, requirement = %version, "apt cannot pin a range, installing candidate");
        }
        target.to_string()
      }
    };

    ["install", "-y", "--no-install-recommends"]
      .into_iter()
      .map(String::from)
      .chain(std::iter::once(package))
      .collect()
  }
}

impl Default for AptManager {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl PackageManager for AptManager {
  fn command(&self) -> &str {
    &self.program
  }

  async fn version(&self) -> Result<String, ManagerError> {
    let output = run_command(&self.program, &["--version".to_string()], &BTreeMap::new()).await?;
    parse_version(&output.stdout, &VERSION_PATTERN).ok_or_else(|| ManagerError::VersionUnparsable {
      program: self.program.clone(),
      output: output.stdout,
    })
  }

  async fn prepare(&self) -> Result<(), ManagerError> {
    run_command(&self.program, &["update".to_string()], &Self::env()).await?;
    Ok(())
  }

  async fn install(
    &self,
    _name: &str,
    target: &str,
    version: Option<&str>,
    _options: &Options,
  ) -> Result<String, ManagerError> {
    let output = run_command(&self.program, &Self::install_args(target, version), &Self::env()).await?;
    Ok(output.stdout)
  }
}
