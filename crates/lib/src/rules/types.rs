//! Types shared by rule declaration and rule resolution.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingredient::{IngredientSpec, IngredientVersion, Options, SpecError};

/// Errors raised while an ingredient declares its rules.
///
/// These are authoring mistakes and fail fast, unlike resolution problems
/// which are carried as data on the dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
  /// A `needs` declaration could not be parsed.
  #[error("invalid dependency: {0}")]
  InvalidSpec(#[from] SpecError),

  /// A scope received a second build instruction.
  #[error("{scope} already has a build instruction ({existing})")]
  DuplicateBuild { scope: String, existing: BuildInstruction },

  /// A sub-scope was opened from a scope that cannot hold it.
  #[error("cannot open a {requested} scope inside {scope}")]
  ScopeMismatch { scope: String, requested: Level },

  /// The ingredient's own setup logic failed.
  #[error("setup of '{ingredient}' failed: {reason}")]
  Setup { ingredient: String, reason: String },
}

/// Depth of an override node in a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Platform,
  Distro,
  Release,
}

impl Level {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Platform => "platform",
      Self::Distro => "distro",
      Self::Release => "release",
    }
  }

  /// The level directly below this one, if any.
  pub fn child(&self) -> Option<Self> {
    match self {
      Self::Platform => Some(Self::Distro),
      Self::Distro => Some(Self::Release),
      Self::Release => None,
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A declared dependency: `needs(spec, options)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
  pub name: String,
  pub version: IngredientVersion,
  pub options: Options,
}

impl Dependency {
  pub fn new(spec: IngredientSpec, options: Options) -> Self {
    Self {
      name: spec.name,
      version: spec.version,
      options,
    }
  }

  pub fn spec(&self) -> IngredientSpec {
    IngredientSpec {
      name: self.name.clone(),
      version: self.version.clone(),
    }
  }
}

/// What a verification predicate gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct VerifyRequest<'a> {
  pub name: &'a str,
  pub version: &'a IngredientVersion,
  pub options: &'a Options,
}

type VerifyFn = dyn Fn(&VerifyRequest<'_>) -> bool + Send + Sync;

/// An optional runtime check reporting whether an ingredient is already present.
#[derive(Clone)]
pub struct Verify(Arc<VerifyFn>);

impl Verify {
  pub fn new<F>(predicate: F) -> Self
  where
    F: Fn(&VerifyRequest<'_>) -> bool + Send + Sync + 'static,
  {
    Self(Arc::new(predicate))
  }

  /// Passes when `program` can be found on `PATH`.
  pub fn executable(program: impl Into<String>) -> Self {
    let program = program.into();
    Self::new(move |_| which::which(&program).is_ok())
  }

  pub fn check(&self, request: &VerifyRequest<'_>) -> bool {
    (self.0)(request)
  }

  /// Whether two handles share the same predicate.
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for Verify {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Verify(..)")
  }
}

/// The action a build instruction asks of its package manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildAction {
  #[default]
  Install,
}

impl fmt::Display for BuildAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Install => f.write_str("install"),
    }
  }
}

/// An opaque directive naming a package manager, an action and its target.
///
/// The target is a package name for regular managers or a script path for
/// script runners such as `bash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildInstruction {
  pub manager: String,
  pub action: BuildAction,
  pub target: String,
}

impl BuildInstruction {
  /// Install the named package with `manager`.
  pub fn package(manager: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      manager: manager.into(),
      action: BuildAction::Install,
      target: name.into(),
    }
  }

  /// Run the script at `path` through `manager`.
  pub fn script(manager: impl Into<String>, path: impl Into<String>) -> Self {
    Self::package(manager, path)
  }

  pub fn apt(name: impl Into<String>) -> Self {
    Self::package("apt", name)
  }

  pub fn bash(path: impl Into<String>) -> Self {
    Self::script("bash", path)
  }
}

impl fmt::Display for BuildInstruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {}", self.manager, self.action, self.target)
  }
}

/// The outcome of resolving a rule set for one platform/distro/release.
#[derive(Debug, Clone, Default)]
pub struct Rule {
  pub dependencies: Vec<Dependency>,
  pub verify: Option<Verify>,
  pub build: Option<BuildInstruction>,
}

impl Rule {
  pub fn buildable(&self) -> bool {
    self.build.is_some()
  }
}
