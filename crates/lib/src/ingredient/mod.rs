//! Ingredients: named, versioned, optioned units of software.
//!
//! An [`Ingredient`] pairs a request (name, version, options) with the
//! [`IngredientDef`] that knows how to declare its platform rules. The rule set
//! is produced lazily, once per ingredient, by running the definition's setup
//! against a fresh [`RuleSetBuilder`].

pub mod spec;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::rules::{RuleError, RuleSet, RuleSetBuilder};

pub use spec::{IngredientSpec, IngredientVersion, LATEST, SpecError};

/// Free-form options passed through to build instructions untouched.
pub type Options = BTreeMap<String, String>;

/// Declares the platform rules of one kind of ingredient.
///
/// Implementations call [`RuleSetBuilder::platform`] for every platform they
/// support and describe dependencies, verification and build instructions
/// inside each scope.
pub trait IngredientDef: Send + Sync {
  fn setup(&self, rules: &mut RuleSetBuilder, ingredient: &Ingredient) -> Result<(), RuleError>;
}

/// A single requested ingredient.
pub struct Ingredient {
  name: String,
  version: IngredientVersion,
  options: Options,
  def: Arc<dyn IngredientDef>,
  rules: OnceLock<Result<RuleSet, RuleError>>,
}

impl Ingredient {
  pub fn new(spec: IngredientSpec, options: Options, def: Arc<dyn IngredientDef>) -> Self {
    Self {
      name: spec.name,
      version: spec.version,
      options,
      def,
      rules: OnceLock::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn version(&self) -> &IngredientVersion {
    &self.version
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  /// The rule set declared by this ingredient's definition.
  ///
  /// Built on first access and cached; a setup failure is cached as well.
  pub fn rules(&self) -> Result<&RuleSet, &RuleError> {
    self
      .rules
      .get_or_init(|| {
        trace!(ingredient = %self.name, "building rule set");
        let mut builder = RuleSetBuilder::new();
        self.def.setup(&mut builder, self)?;
        Ok(builder.finish())
      })
      .as_ref()
  }
}

impl fmt::Debug for Ingredient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Ingredient")
      .field("name", &self.name)
      .field("version", &self.version)
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}
