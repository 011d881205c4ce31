//! Package-manager contract and backends.
//!
//! The executor drives everything through [`PackageManager`]. Backends:
//! - [`AptManager`]: Debian-family `apt-get`
//! - [`BashManager`]: runs install scripts through `bash`
//! - [`DryRunManager`]: records actions without running anything

pub mod apt;
pub mod bash;
pub mod command;
pub mod dry_run;
pub mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::ingredient::Options;

pub use apt::AptManager;
pub use bash::BashManager;
pub use dry_run::DryRunManager;
pub use types::ManagerError;

/// An external package manager.
#[async_trait]
pub trait PackageManager: Send + Sync {
  /// Identifying token, usually the executable name.
  fn command(&self) -> &str;

  /// Detected version of the manager.
  async fn version(&self) -> Result<String, ManagerError>;

  /// Whether `version` is one this backend can drive.
  fn supported(&self, _version: &str) -> bool {
    true
  }

  /// Whether the manager is present and its version is supported.
  async fn installed(&self) -> bool {
    match self.version().await {
      Ok(version) => {
        let supported = self.supported(&version);
        debug!(manager = %self.command(), version = %version, supported, "checked manager");
        supported
      }
      Err(e) => {
        debug!(manager = %self.command(), error = %e, "manager unavailable");
        false
      }
    }
  }

  /// One-time setup before any install, such as refreshing an index.
  /// Must be idempotent.
  async fn prepare(&self) -> Result<(), ManagerError>;

  /// Install `target` (a package name or script) for ingredient `name`.
  ///
  /// `version` is `None` for the latest version. Returns captured output.
  async fn install(
    &self,
    name: &str,
    target: &str,
    version: Option<&str>,
    options: &Options,
  ) -> Result<String, ManagerError>;
}

/// Package managers available to the executor, keyed by the name build
/// instructions refer to (`apt`, `bash`).
#[derive(Clone, Default)]
pub struct ManagerRegistry {
  managers: BTreeMap<String, Arc<dyn PackageManager>>,
}

impl ManagerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry with the process-backed `apt` and `bash` managers.
  pub fn system() -> Self {
    let mut registry = Self::new();
    registry.register("apt", Arc::new(AptManager::new()));
    registry.register("bash", Arc::new(BashManager::new()));
    registry
  }

  /// Registry where every name of `names` records actions instead of running them.
  pub fn dry_run<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
    let mut registry = Self::new();
    for name in names {
      registry.register(name, Arc::new(DryRunManager::new(name)));
    }
    registry
  }

  pub fn register(&mut self, name: impl Into<String>, manager: Arc<dyn PackageManager>) -> &mut Self {
    self.managers.insert(name.into(), manager);
    self
  }

  pub fn get(&self, name: &str) -> Option<&Arc<dyn PackageManager>> {
    self.managers.get(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.managers.keys().map(String::as_str)
  }
}

impl std::fmt::Debug for ManagerRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ManagerRegistry")
      .field("managers", &self.managers.keys().collect::<Vec<_>>())
      .finish()
  }
}
