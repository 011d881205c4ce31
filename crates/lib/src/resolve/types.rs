//! Types produced by dependency resolution.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingredient::{IngredientVersion, Options, SpecError};
use crate::rules::{BuildInstruction, Verify, VerifyRequest};

/// Errors that stop resolution outright.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("unknown ingredient '{name}'")]
  UnknownIngredient { name: String },

  #[error(transparent)]
  InvalidSpec(#[from] SpecError),
}

/// A problem recorded on a dependency node.
///
/// Issues are data: tree construction always completes and the issue stays
/// visible in the flattened sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
  /// The rule resolved for the host has no build instruction.
  CannotBuild,
  /// The ingredient's rule set could not be produced.
  CannotSatisfy,
  /// The ingredient already appears on the path from the root.
  Circular,
}

impl Issue {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::CannotBuild => "cannot_build",
      Self::CannotSatisfy => "cannot_satisfy",
      Self::Circular => "circular",
    }
  }
}

impl fmt::Display for Issue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One install-ready step of a flattened build sequence.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedIngredient {
  pub name: String,
  pub version: IngredientVersion,
  pub options: Options,
  #[serde(skip)]
  pub verify: Option<Verify>,
  pub build: Option<BuildInstruction>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub issue: Option<Issue>,
}

impl PreparedIngredient {
  pub fn has_issue(&self) -> bool {
    self.issue.is_some()
  }

  /// Name of the manager the build instruction dispatches to.
  pub fn manager(&self) -> Option<&str> {
    self.build.as_ref().map(|b| b.manager.as_str())
  }

  /// Run the verification predicate, if any.
  pub fn is_present(&self) -> Option<bool> {
    let verify = self.verify.as_ref()?;
    Some(verify.check(&VerifyRequest {
      name: &self.name,
      version: &self.version,
      options: &self.options,
    }))
  }
}

impl fmt::Display for PreparedIngredient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.name, self.version)?;
    match (&self.build, self.issue) {
      (_, Some(issue)) => write!(f, " [{}]", issue),
      (Some(build), None) => write!(f, ": {}", build),
      (None, None) => Ok(()),
    }
  }
}

/// A reason the build sequence cannot be carried out as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
  Ingredient { name: String, issue: Issue },
  ManagerUnavailable { manager: String },
  ManagerUnknown { manager: String },
}

impl fmt::Display for Problem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Ingredient { name, issue } => write!(f, "ingredient '{}': {}", name, issue),
      Self::ManagerUnavailable { manager } => write!(f, "package manager '{}' is not installed", manager),
      Self::ManagerUnknown { manager } => write!(f, "package manager '{}' is not supported", manager),
    }
  }
}

/// What to do when problems were found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueDecision {
  #[default]
  Abort,
  /// Continue, skipping entries that carry an issue.
  Proceed,
}

impl fmt::Display for IssueDecision {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Abort => f.write_str("abort"),
      Self::Proceed => f.write_str("proceed"),
    }
  }
}

/// Result of a satisfiability check.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Satisfiability {
  pub problems: Vec<Problem>,
  /// Managers referenced by buildable entries, in first-seen order.
  pub managers: Vec<String>,
  /// The handler's decision; `None` when there was nothing to decide.
  pub decision: Option<IssueDecision>,
}

impl Satisfiability {
  pub fn is_satisfied(&self) -> bool {
    self.problems.is_empty()
  }

  /// Whether execution may go ahead.
  pub fn may_proceed(&self) -> bool {
    self.is_satisfied() || self.decision == Some(IssueDecision::Proceed)
  }
}
