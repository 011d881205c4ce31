//! Host detection.
//!
//! A [`Host`] names the platform, distribution and release rules are resolved
//! against, and records which package-manager executables are present.

pub mod os;
pub mod os_release;
pub mod paths;

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{OS_RELEASE_FALLBACK_PATH, OS_RELEASE_PATH};

use os_release::OsRelease;

/// Package-manager executables probed on `PATH`, keyed by manager name.
pub const KNOWN_MANAGERS: &[(&str, &str)] = &[
  ("apt", "apt-get"),
  ("dpkg", "dpkg"),
  ("apk", "apk"),
  ("rpm", "rpm"),
  ("yum", "yum"),
  ("dnf", "dnf"),
  ("pacman", "pacman"),
  ("emerge", "emerge"),
  ("npm", "npm"),
  ("gem", "gem"),
  ("pip", "pip"),
  ("bash", "bash"),
];

/// Errors that can occur while detecting the host.
#[derive(Debug, Error)]
pub enum HostError {
  #[error("failed to read {path}: {source}")]
  OsRelease {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// The system ingredients are resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Host {
  pub os: String,
  pub distribution: Option<String>,
  pub release: Option<String>,
  pub managers: BTreeSet<String>,
}

impl Host {
  /// A host on platform `os` with no distribution, release or managers.
  pub fn new(os: impl Into<String>) -> Self {
    Self {
      os: os.into(),
      distribution: None,
      release: None,
      managers: BTreeSet::new(),
    }
  }

  pub fn with_distribution(mut self, distribution: impl Into<String>) -> Self {
    self.distribution = Some(distribution.into());
    self
  }

  pub fn with_release(mut self, release: impl Into<String>) -> Self {
    self.release = Some(release.into());
    self
  }

  /// Detect the running host.
  ///
  /// On Linux the distribution and release come from os-release; a missing
  /// file leaves both unset.
  pub fn detect() -> Result<Self, HostError> {
    let mut host = Self::new(os::platform_id());

    if host.os == "linux"
      && let Some(release) = read_os_release(&[Path::new(OS_RELEASE_PATH), Path::new(OS_RELEASE_FALLBACK_PATH)])?
    {
      host.distribution = release.id;
      host.release = release.version_id;
    }

    host.managers = KNOWN_MANAGERS
      .iter()
      .filter(|(_, program)| which::which(program).is_ok())
      .map(|(name, _)| name.to_string())
      .collect();

    info!(
      os = %host.os,
      distribution = ?host.distribution,
      release = ?host.release,
      managers = ?host.managers,
      "detected host"
    );

    Ok(host)
  }

  pub fn distribution(&self) -> Option<&str> {
    self.distribution.as_deref()
  }

  pub fn release(&self) -> Option<&str> {
    self.release.as_deref()
  }
}

impl fmt::Display for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.os)?;
    if let Some(distribution) = &self.distribution {
      write!(f, "/{}", distribution)?;
      if let Some(release) = &self.release {
        write!(f, "/{}", release)?;
      }
    }
    Ok(())
  }
}

/// Load the first os-release file that exists.
fn read_os_release(candidates: &[&Path]) -> Result<Option<OsRelease>, HostError> {
  for path in candidates {
    match OsRelease::load(path) {
      Ok(release) => return Ok(Some(release)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "os-release not found");
      }
      Err(source) => {
        return Err(HostError::OsRelease {
          path: path.to_path_buf(),
          source,
        });
      }
    }
  }
  Ok(None)
}
