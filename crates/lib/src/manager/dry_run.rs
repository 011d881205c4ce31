//! A package manager that only records what it was asked to do.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::ingredient::Options;

use super::PackageManager;
use super::types::ManagerError;

/// Records prepare/install requests instead of running them.
///
/// Always reports itself as installed.
#[derive(Debug)]
pub struct DryRunManager {
  name: String,
  actions: Mutex<Vec<String>>,
}

impl DryRunManager {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      actions: Mutex::new(Vec::new()),
    }
  }

  /// Recorded actions in call order, e.g. `apt install curl`.
  pub fn actions(&self) -> Vec<String> {
    self.actions.lock().map(|a| a.clone()).unwrap_or_default()
  }

  fn record(&self, action: String) -> String {
    info!(action = %action, "dry run");
    if let Ok(mut actions) = self.actions.lock() {
      actions.push(action.clone());
    }
    action
  }
}

#[async_trait]
impl PackageManager for DryRunManager {
  fn command(&self) -> &str {
    &self.name
  }

  async fn version(&self) -> Result<String, ManagerError> {
    Ok("0.0.0".to_string())
  }

  async fn prepare(&self) -> Result<(), ManagerError> {
    self.record(format!("{} prepare", self.name));
    Ok(())
  }

  async fn install(
    &self,
    _name: &str,
    target: &str,
    version: Option<&str>,
    _options: &Options,
  ) -> Result<String, ManagerError> {
    let action = match version {
      Some(version) => format!("{} install {}@{}", self.name, target, version),
      None => format!("{} install {}", self.name, target),
    };
    Ok(self.record(action))
  }
}
