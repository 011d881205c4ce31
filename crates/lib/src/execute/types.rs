//! Types for build-sequence execution.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::manager::ManagerError;
use crate::resolve::Issue;

/// Errors that stop execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// A build instruction names a manager with no registered backend.
  #[error("no backend for package manager '{manager}' (needed by {ingredient})")]
  UnknownManager { manager: String, ingredient: String },

  /// One-time preparation of a manager failed; nothing was installed.
  #[error("preparing {manager} failed: {source}")]
  PrepareFailed {
    manager: String,
    #[source]
    source: ManagerError,
  },

  /// An install failed; later entries were not attempted.
  #[error("installing {ingredient} with {manager} failed: {source}")]
  InstallFailed {
    ingredient: String,
    manager: String,
    #[source]
    source: ManagerError,
  },

  /// An external action exceeded the configured timeout.
  #[error("{action} timed out after {}s", .after.as_secs_f64())]
  Timeout { action: String, after: Duration },
}

impl ExecuteError {
  /// Captured output of the failed command, if any.
  pub fn output(&self) -> Option<&str> {
    match self {
      Self::PrepareFailed { source, .. } | Self::InstallFailed { source, .. } => source.output(),
      _ => None,
    }
  }
}

/// Configuration for execution.
#[derive(Debug, Clone, Default)]
pub struct ExecuteConfig {
  /// Upper bound for each prepare or install action.
  pub action_timeout: Option<Duration>,

  /// Skip installs whose verification predicate reports the ingredient present.
  pub verify: bool,
}

/// What happened to one entry of the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  Installed { output: String },
  AlreadyPresent,
  Skipped { issue: Issue },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRecord {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub manager: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target: Option<String>,
  #[serde(flatten)]
  pub outcome: Outcome,
}

/// Result of a completed execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecuteReport {
  /// Managers prepared, in order.
  pub prepared: Vec<String>,
  /// One record per sequence entry, in sequence order.
  pub records: Vec<InstallRecord>,
}

impl ExecuteReport {
  pub fn installed(&self) -> usize {
    self.count(|o| matches!(o, Outcome::Installed { .. }))
  }

  pub fn already_present(&self) -> usize {
    self.count(|o| matches!(o, Outcome::AlreadyPresent))
  }

  pub fn skipped(&self) -> usize {
    self.count(|o| matches!(o, Outcome::Skipped { .. }))
  }

  fn count(&self, f: impl Fn(&Outcome) -> bool) -> usize {
    self.records.iter().filter(|r| f(&r.outcome)).count()
  }
}
