//! Ingredients with rules beyond a single catalog package.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ingredient::{Ingredient, IngredientDef};
use crate::platform::paths;
use crate::rules::{BuildInstruction, RuleError, RuleSetBuilder, Verify};

const GIT_REPO_UBUNTU: &str = include_str!("../../scripts/git_repo/ubuntu.sh");

/// `git`, fetched over HTTPS, so it needs certificates and curl.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git;

impl IngredientDef for Git {
  fn setup(&self, rules: &mut RuleSetBuilder, _ingredient: &Ingredient) -> Result<(), RuleError> {
    rules.platform("linux", |linux| {
      linux.needs("ca_certificates")?.needs("curl")?;
      linux.verify(Verify::executable("git"));
      linux.build_distro("ubuntu", BuildInstruction::apt("git"))?;
      linux.build_distro("debian", BuildInstruction::apt("git"))?;
      Ok(())
    })?;
    Ok(())
  }
}

/// Python 3 interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Python;

impl IngredientDef for Python {
  fn setup(&self, rules: &mut RuleSetBuilder, _ingredient: &Ingredient) -> Result<(), RuleError> {
    rules.platform("linux", |linux| {
      linux.verify(Verify::executable("python3"));
      linux.build_distro("ubuntu", BuildInstruction::apt("python3"))?;
      linux.build_distro("debian", BuildInstruction::apt("python3"))?;
      Ok(())
    })?;
    Ok(())
  }
}

/// A git checkout, cloned by a bundled bash script.
///
/// Options: `repo` (clone URL) and `to` (destination directory). The script
/// is written into the scripts directory when the rules are first built.
#[derive(Debug, Clone)]
pub struct GitRepo {
  script_dir: PathBuf,
}

impl GitRepo {
  pub fn new() -> Self {
    Self::with_script_dir(paths::scripts_dir())
  }

  pub fn with_script_dir(dir: impl Into<PathBuf>) -> Self {
    Self { script_dir: dir.into() }
  }
}

impl Default for GitRepo {
  fn default() -> Self {
    Self::new()
  }
}

impl IngredientDef for GitRepo {
  fn setup(&self, rules: &mut RuleSetBuilder, ingredient: &Ingredient) -> Result<(), RuleError> {
    let script = write_script(&self.script_dir.join("git_repo"), "ubuntu.sh", GIT_REPO_UBUNTU).map_err(|e| {
      RuleError::Setup {
        ingredient: ingredient.name().to_string(),
        reason: format!("cannot write install script to {}: {}", self.script_dir.display(), e),
      }
    })?;

    rules.platform("linux", |linux| {
      linux.needs("git")?;
      linux.build_distro("ubuntu", BuildInstruction::bash(script.to_string_lossy()))?;
      Ok(())
    })?;
    Ok(())
  }
}

/// Write `content` to `dir/name` unless it is already there.
fn write_script(dir: &Path, name: &str, content: &str) -> io::Result<PathBuf> {
  let path = dir.join(name);
  if std::fs::read_to_string(&path).is_ok_and(|existing| existing == content) {
    return Ok(path);
  }
  std::fs::create_dir_all(dir)?;
  std::fs::write(&path, content)?;
  debug!(path = %path.display(), "wrote install script");
  Ok(path)
}
