//! `sous plan`: resolve a recipe without installing anything.

use anyhow::{Context, Result};

use sous_lib::Config;
use sous_lib::manager::ManagerRegistry;

use super::{HostArgs, RecipeArgs, kitchen};
use crate::output::{OutputFormat, plural, print_info, print_json, print_step, print_warning};

pub fn cmd_plan(config: &Config, recipe: &RecipeArgs, host: &HostArgs, output: OutputFormat) -> Result<()> {
  let host = host.host()?;
  let kitchen = kitchen(config, host, recipe, ManagerRegistry::new())?;
  let plan = kitchen.plan().context("Failed to resolve ingredients")?;

  if output.is_json() {
    return print_json(&plan);
  }

  print_info(&format!(
    "Plan for {}: {}",
    plan.host,
    plural(plan.sequence.len(), "step")
  ));
  for (i, step) in plan.sequence.iter().enumerate() {
    let detail = match (&step.build, step.issue) {
      (_, Some(issue)) => format!("[{}]", issue),
      (Some(build), None) => build.to_string(),
      (None, None) => "-".to_string(),
    };
    print_step(i + 1, &format!("{}@{}", step.name, step.version), &detail);
  }

  let problems = plan.problems().count();
  if problems > 0 {
    println!();
    print_warning(&format!("{} cannot be built on {}", plural(problems, "ingredient"), plan.host));
  }

  Ok(())
}
