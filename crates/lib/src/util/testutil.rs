//! Test helpers for sous-lib.
//!
//! Shell helpers for command tests and [`FakeManager`], an in-memory
//! [`PackageManager`] whose availability and failures are scripted.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ingredient::Options;
use crate::manager::{ManagerError, PackageManager};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

/// Write an executable `/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// A scripted package manager.
#[derive(Debug)]
pub struct FakeManager {
  name: String,
  version: Option<String>,
  min_version: Option<semver::Version>,
  fail_prepare: bool,
  fail_install: Vec<String>,
  delay: Option<std::time::Duration>,
  actions: Mutex<Vec<String>>,
  journal: Option<Journal>,
}

/// Actions of several fake managers in global call order.
pub type Journal = Arc<Mutex<Vec<String>>>;

impl FakeManager {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      version: Some("1.0.0".to_string()),
      min_version: None,
      fail_prepare: false,
      fail_install: Vec::new(),
      delay: None,
      actions: Mutex::new(Vec::new()),
      journal: None,
    }
  }

  pub fn with_version(mut self, version: &str) -> Self {
    self.version = Some(version.to_string());
    self
  }

  pub fn with_min_version(mut self, version: &str) -> Self {
    self.min_version = Some(semver::Version::parse(version).unwrap());
    self
  }

  /// Not present on the host.
  pub fn missing(mut self) -> Self {
    self.version = None;
    self
  }

  pub fn failing_prepare(mut self) -> Self {
    self.fail_prepare = true;
    self
  }

  /// Fail installs of `target`.
  pub fn failing_install(mut self, target: &str) -> Self {
    self.fail_install.push(target.to_string());
    self
  }

  /// Sleep this long in every install.
  pub fn slow(mut self, delay: std::time::Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  /// Also record actions, prefixed with the manager name, into `journal`.
  pub fn with_journal(mut self, journal: &Journal) -> Self {
    self.journal = Some(Arc::clone(journal));
    self
  }

  pub fn actions(&self) -> Vec<String> {
    self.actions.lock().unwrap().clone()
  }

  fn record(&self, action: String) {
    if let Some(journal) = &self.journal {
      journal.lock().unwrap().push(format!("{}: {}", self.name, action));
    }
    self.actions.lock().unwrap().push(action);
  }
}

#[async_trait]
impl PackageManager for FakeManager {
  fn command(&self) -> &str {
    &self.name
  }

  async fn version(&self) -> Result<String, ManagerError> {
    self.version.clone().ok_or_else(|| ManagerError::NotFound {
      program: self.name.clone(),
    })
  }

  fn supported(&self, version: &str) -> bool {
    match (&self.min_version, semver::Version::parse(version)) {
      (Some(min), Ok(version)) => version >= *min,
      (Some(_), Err(_)) => false,
      (None, _) => true,
    }
  }

  async fn prepare(&self) -> Result<(), ManagerError> {
    self.record("prepare".to_string());
    if self.fail_prepare {
      return Err(ManagerError::CommandFailed {
        cmd: format!("{} update", self.name),
        code: Some(1),
        output: "index unavailable".to_string(),
      });
    }
    Ok(())
  }

  async fn install(
    &self,
    _name: &str,
    target: &str,
    _version: Option<&str>,
    _options: &Options,
  ) -> Result<String, ManagerError> {
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    self.record(format!("install {}", target));
    if self.fail_install.iter().any(|t| t == target) {
      return Err(ManagerError::CommandFailed {
        cmd: format!("{} install {}", self.name, target),
        code: Some(100),
        output: format!("E: Unable to locate package {}", target),
      });
    }
    Ok(format!("installed {}", target))
  }
}
