//! `bash` script runner.
//!
//! Install targets are script paths. The script sees the ingredient through
//! environment variables: `name`, `packageName` (the script path),
//! `app_version` (empty for latest), `cmd=install`, plus every option.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::ingredient::Options;

use super::PackageManager;
use super::command::{parse_version, run_command};
use super::types::ManagerError;

static VERSION_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"version (\d+\.\d+(?:\.\d+)?)").expect("bash version pattern is valid"));

/// Runs install scripts with `bash`.
#[derive(Debug, Clone)]
pub struct BashManager {
  program: String,
}

impl BashManager {
  pub fn new() -> Self {
    Self::with_program("bash")
  }

  pub fn with_program(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  fn script_env(name: &str, target: &str, version: Option<&str>, options: &Options) -> BTreeMap<String, String> {
    let mut env = BTreeMap::from([
      ("cmd".to_string(), "install".to_string()),
      ("name".to_string(), name.to_string()),
      ("packageName".to_string(), target.to_string()),
      ("app_version".to_string(), version.unwrap_or_default().to_string()),
    ]);
    // Options win over the defaults.
    env.extend(options.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
  }
}

impl Default for BashManager {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl PackageManager for BashManager {
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
    Ok(())
  }

  async fn install(
    &self,
    name: &str,
    target: &str,
    version: Option<&str>,
    options: &Options,
  ) -> Result<String, ManagerError> {
    let env = Self::script_env(name, target, version, options);
    let output = run_command(&self.program, &[target.to_string()], &env).await?;
    Ok(output.stdout)
  }
}
