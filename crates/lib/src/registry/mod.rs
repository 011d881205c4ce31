//! Ingredient registry.
//!
//! Maps ingredient names to definitions. Dedicated definitions registered by
//! name take precedence over generic catalog entries.

pub mod builtin;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{Catalog, GenericIngredient};
use crate::ingredient::IngredientDef;

pub use builtin::{Git, GitRepo, Python};

/// Name → definition lookup.
#[derive(Clone, Default)]
pub struct Registry {
  defs: BTreeMap<String, Arc<dyn IngredientDef>>,
  catalog: Catalog,
}

impl Registry {
  /// An empty registry backed by `catalog`.
  pub fn new(catalog: Catalog) -> Self {
    Self {
      defs: BTreeMap::new(),
      catalog,
    }
  }

  /// The dedicated ingredients plus `catalog`.
  pub fn with_builtins(catalog: Catalog) -> Self {
    let mut registry = Self::new(catalog);
    registry.register("git", Arc::new(Git));
    registry.register("git_repo", Arc::new(GitRepo::new()));
    registry.register("python", Arc::new(Python));
    registry
  }

  pub fn register(&mut self, name: impl Into<String>, def: Arc<dyn IngredientDef>) -> &mut Self {
    self.defs.insert(name.into(), def);
    self
  }

  /// The definition for `name`, if any.
  pub fn lookup(&self, name: &str) -> Option<Arc<dyn IngredientDef>> {
    if let Some(def) = self.defs.get(name) {
      return Some(Arc::clone(def));
    }
    self
      .catalog
      .get(name)
      .map(|entry| Arc::new(GenericIngredient::new(entry.clone())) as Arc<dyn IngredientDef>)
  }

  /// Whether `name` has a dedicated definition rather than a catalog entry.
  pub fn is_dedicated(&self, name: &str) -> bool {
    self.defs.contains_key(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.defs.contains_key(name) || self.catalog.get(name).is_some()
  }

  /// Every known ingredient name, sorted and deduplicated.
  pub fn names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.defs.keys().map(String::as_str).chain(self.catalog.names()).collect();
    names.sort_unstable();
    names.dedup();
    names
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }
}

impl std::fmt::Debug for Registry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Registry")
      .field("defs", &self.defs.keys().collect::<Vec<_>>())
      .field("catalog", &self.catalog.len())
      .finish()
  }
}
