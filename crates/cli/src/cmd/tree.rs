use anyhow::{Context, Result};

use sous_lib::Config;
use sous_lib::manager::ManagerRegistry;

use super::{HostArgs, RecipeArgs, kitchen};

pub fn cmd_tree(config: &Config, recipe: &RecipeArgs, host: &HostArgs) -> Result<()> {
  let host = host.host()?;
  let kitchen = kitchen(config, host, recipe, ManagerRegistry::new())?;
  let plan = kitchen.plan().context("Failed to resolve ingredients")?;
  print!("{}", plan.tree);
  Ok(())
}
