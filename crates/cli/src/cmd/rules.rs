//! `sous rules`: show what an ingredient declares for each platform.

use anyhow::{Result, anyhow, bail};

use sous_lib::Config;
use sous_lib::ingredient::{Ingredient, IngredientSpec, Options};
use sous_lib::registry::Registry;

pub fn cmd_rules(config: &Config, name: &str) -> Result<()> {
  let registry = Registry::with_builtins(config.catalog());
  let Some(def) = registry.lookup(name) else {
    bail!("Unknown ingredient: {}", name);
  };

  let ingredient = Ingredient::new(IngredientSpec::latest(name), Options::new(), def);
  let rules = ingredient
    .rules()
    .map_err(|e| anyhow!("Failed to build rules for {}: {}", name, e))?;

  if rules.is_empty() {
    println!("{} declares no platforms", name);
  } else {
    print!("{}", rules.describe());
  }
  Ok(())
}
