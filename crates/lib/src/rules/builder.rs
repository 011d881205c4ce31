//! Declaration surface for ingredient rules.
//!
//! Ingredients describe their rules through explicit scope handles instead of
//! an implicit "current scope":
//!
//! ```
//! use sous_lib::rules::{BuildInstruction, RuleSetBuilder};
//!
//! let mut rules = RuleSetBuilder::new();
//! rules
//!   .platform("linux", |linux| {
//!     linux.needs("ca_certificates")?.needs("curl")?;
//!     linux.build_distro("ubuntu", BuildInstruction::apt("git"))?;
//!     Ok(())
//!   })
//!   .unwrap();
//! let set = rules.finish();
//! assert!(set.resolve("linux", Some("ubuntu"), None).buildable());
//! ```

use tracing::trace;

use crate::ingredient::{IngredientSpec, Options};

use super::types::{BuildInstruction, Dependency, Level, RuleError, Verify};
use super::{NodeId, RuleSet};

/// Accumulates override declarations into a [`RuleSet`].
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
  set: RuleSet,
}

impl RuleSetBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Open the scope for platform `id` and run `setup` against it.
  ///
  /// Opening an already declared platform adds to its existing declarations.
  pub fn platform<F>(&mut self, id: &str, setup: F) -> Result<&mut Self, RuleError>
  where
    F: FnOnce(&mut Scope<'_>) -> Result<(), RuleError>,
  {
    let node = self.set.platform_node(id);
    let mut scope = Scope {
      set: &mut self.set,
      node,
    };
    setup(&mut scope)?;
    Ok(self)
  }

  pub fn finish(self) -> RuleSet {
    self.set
  }
}

/// A handle on one override node (platform, distro or release).
pub struct Scope<'a> {
  set: &'a mut RuleSet,
  node: NodeId,
}

impl Scope<'_> {
  pub fn level(&self) -> Level {
    self.set.node(self.node).level
  }

  pub fn key(&self) -> &str {
    &self.set.node(self.node).key
  }

  /// Append a dependency on `spec` (`name` or `name@requirement`).
  pub fn needs(&mut self, spec: &str) -> Result<&mut Self, RuleError> {
    self.needs_with(spec, Options::new())
  }

  /// Append a dependency on `spec`, forwarding `options` to it.
  pub fn needs_with(&mut self, spec: &str, options: Options) -> Result<&mut Self, RuleError> {
    let spec = IngredientSpec::parse(spec)?;
    trace!(scope = %self.set.path(self.node), dependency = %spec, "needs");
    self
      .set
      .node_mut(self.node)
      .dependencies
      .push(Dependency::new(spec, options));
    Ok(self)
  }

  /// Exclude inherited ancestor dependencies when this scope is matched.
  pub fn only_needs(&mut self) -> &mut Self {
    self.set.node_mut(self.node).only_needs = true;
    self
  }

  /// Attach a verification predicate to this scope.
  pub fn verify(&mut self, verify: Verify) -> &mut Self {
    self.set.node_mut(self.node).verify = Some(verify);
    self
  }

  /// Attach a build instruction to this scope.
  pub fn build(&mut self, instruction: BuildInstruction) -> Result<&mut Self, RuleError> {
    if let Some(existing) = self.set.node(self.node).build.clone() {
      return Err(RuleError::DuplicateBuild {
        scope: self.set.path(self.node),
        existing,
      });
    }
    self.set.node_mut(self.node).build = Some(instruction);
    Ok(self)
  }

  /// Open (or re-open) distro `id` below this platform scope.
  pub fn distro(&mut self, id: &str) -> Result<Scope<'_>, RuleError> {
    self.child(Level::Platform, Level::Distro, id)
  }

  /// Open (or re-open) release `id` below this distro scope.
  pub fn release(&mut self, id: &str) -> Result<Scope<'_>, RuleError> {
    self.child(Level::Distro, Level::Release, id)
  }

  /// Open release `release` of `distro` below this platform scope, creating
  /// the distro on demand.
  pub fn release_of(&mut self, distro: &str, release: &str) -> Result<Scope<'_>, RuleError> {
    let distro_node = self.child_id(Level::Platform, Level::Distro, distro)?;
    let node = self.set.child_node(distro_node, Level::Release, release);
    Ok(Scope {
      set: &mut *self.set,
      node,
    })
  }

  /// Attach a build instruction to `distro`, returning its scope.
  pub fn build_distro(&mut self, distro: &str, instruction: BuildInstruction) -> Result<Scope<'_>, RuleError> {
    let mut scope = self.distro(distro)?;
    scope.build(instruction)?;
    Ok(scope)
  }

  /// Attach a build instruction to `release` of `distro`, returning its scope.
  pub fn build_release(
    &mut self,
    distro: &str,
    release: &str,
    instruction: BuildInstruction,
  ) -> Result<Scope<'_>, RuleError> {
    let mut scope = self.release_of(distro, release)?;
    scope.build(instruction)?;
    Ok(scope)
  }

  fn child(&mut self, expected: Level, level: Level, key: &str) -> Result<Scope<'_>, RuleError> {
    let node = self.child_id(expected, level, key)?;
    Ok(Scope {
      set: &mut *self.set,
      node,
    })
  }

  fn child_id(&mut self, expected: Level, level: Level, key: &str) -> Result<NodeId, RuleError> {
    if self.level() != expected {
      return Err(RuleError::ScopeMismatch {
        scope: self.set.path(self.node),
        requested: level,
      });
    }
    Ok(self.set.child_node(self.node, level, key))
  }
}
