//! Textual ingredient specs.
//!
//! An ingredient is requested as `name` or `name@requirement`, where the
//! requirement is a semver range (`curl@^7.80`, `git@=2.43.0`). A missing
//! requirement, or the literal `latest`, selects the newest available package.

use std::fmt;
use std::str::FromStr;

use semver::{Op, VersionReq};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Sentinel used when no version requirement was given.
pub const LATEST: &str = "latest";

/// Errors produced while parsing an ingredient spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
  #[error("ingredient spec is empty")]
  Empty,

  #[error("invalid ingredient name '{name}': only ASCII letters, digits, '_' and '-' are allowed")]
  InvalidName { name: String },

  #[error("invalid version requirement '{requirement}' for '{name}': {reason}")]
  InvalidVersion {
    name: String,
    requirement: String,
    reason: String,
  },
}

/// The version half of an ingredient spec.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IngredientVersion {
  #[default]
  Latest,
  Req(VersionReq),
}

impl IngredientVersion {
  pub fn is_latest(&self) -> bool {
    matches!(self, Self::Latest)
  }

  /// The version handed to package managers, or `None` for [`Self::Latest`].
  pub fn install_version(&self) -> Option<String> {
    match self {
      Self::Latest => None,
      Self::Req(req) => Some(req.to_string()),
    }
  }

  /// Returns the pinned `major.minor.patch` when the requirement is a single
  /// exact comparator such as `=2.43.0`.
  pub fn exact(&self) -> Option<String> {
    let Self::Req(req) = self else {
      return None;
    };
    match req.comparators.as_slice() {
      [c] if c.op == Op::Exact && c.pre.is_empty() => {
        let (minor, patch) = (c.minor?, c.patch?);
        Some(format!("{}.{}.{}", c.major, minor, patch))
      }
      _ => None,
    }
  }
}

impl FromStr for IngredientVersion {
  type Err = semver::Error;

  /// Parse a requirement, accepting the `latest` sentinel.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      LATEST => Ok(Self::Latest),
      requirement => VersionReq::parse(requirement).map(Self::Req),
    }
  }
}

impl fmt::Display for IngredientVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Latest => f.write_str(LATEST),
      Self::Req(req) => write!(f, "{}", req),
    }
  }
}

impl Serialize for IngredientVersion {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// A parsed `name[@requirement]` spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientSpec {
  pub name: String,
  pub version: IngredientVersion,
}

impl IngredientSpec {
  /// Parse a spec string.
  pub fn parse(spec: &str) -> Result<Self, SpecError> {
    let spec = spec.trim();
    if spec.is_empty() {
      return Err(SpecError::Empty);
    }

    let (name, requirement) = match spec.split_once('@') {
      Some((name, requirement)) => (name.trim(), Some(requirement.trim())),
      None => (spec, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
      return Err(SpecError::InvalidName { name: name.to_string() });
    }

    let version = match requirement {
      None => IngredientVersion::Latest,
      Some(requirement) => requirement.parse().map_err(|e: semver::Error| SpecError::InvalidVersion {
        name: name.to_string(),
        requirement: requirement.to_string(),
        reason: e.to_string(),
      })?,
    };

    Ok(Self {
      name: name.to_string(),
      version,
    })
  }

  /// Spec for `name` at its latest version.
  pub fn latest(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      version: IngredientVersion::Latest,
    }
  }
}

impl FromStr for IngredientSpec {
  type Err = SpecError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for IngredientSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.version {
      IngredientVersion::Latest => f.write_str(&self.name),
      IngredientVersion::Req(req) => write!(f, "{}@{}", self.name, req),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bare_name_is_latest() {
    let spec = IngredientSpec::parse("curl").unwrap();
    assert_eq!(spec.name, "curl");
    assert!(spec.version.is_latest());
    assert_eq!(spec.version.install_version(), None);
  }

  #[test]
  fn explicit_latest_sentinel() {
    let spec = IngredientSpec::parse("curl@latest").unwrap();
    assert!(spec.version.is_latest());
    assert_eq!(spec.to_string(), "curl");
  }

  #[test]
  fn requirement_is_parsed() {
    let spec = IngredientSpec::parse("python@^3.10").unwrap();
    assert_eq!(spec.name, "python");
    assert_eq!(spec.version.install_version().as_deref(), Some("^3.10"));
    assert_eq!(spec.version.exact(), None);
  }

  #[test]
  fn exact_requirement_pins() {
    let spec = IngredientSpec::parse("git@=2.43.0").unwrap();
    assert_eq!(spec.version.exact().as_deref(), Some("2.43.0"));
  }

  #[test]
  fn rejects_bad_names() {
    assert_eq!(IngredientSpec::parse("  "), Err(SpecError::Empty));
    assert!(matches!(
      IngredientSpec::parse("bad name"),
      Err(SpecError::InvalidName { .. })
    ));
    assert!(matches!(IngredientSpec::parse("@1.0"), Err(SpecError::InvalidName { .. })));
  }

  #[test]
  fn rejects_bad_requirement() {
    let err = IngredientSpec::parse("curl@not-a-version").unwrap_err();
    assert!(matches!(err, SpecError::InvalidVersion { ref name, .. } if name == "curl"));
  }

  #[test]
  fn version_serializes_as_string() {
    let spec = IngredientSpec::parse("curl@>=7").unwrap();
    let json = serde_json::to_value(&spec).unwrap();
    assert_eq!(json["version"], ">=7");
    assert_eq!(serde_json::to_value(IngredientVersion::Latest).unwrap(), "latest");
  }
}
