//! `sous cook`: install a recipe.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use sous_lib::execute::Outcome;
use sous_lib::kitchen::KitchenError;
use sous_lib::manager::ManagerRegistry;
use sous_lib::resolve::{IssueDecision, Problem};
use sous_lib::{Config, CookReport};

use super::{HostArgs, RecipeArgs, kitchen};
use crate::output::{OutputFormat, plural, print_error, print_info, print_json, print_success, print_warning};

#[derive(Args, Debug)]
pub struct CookArgs {
  /// Print the actions instead of running package managers
  #[arg(long)]
  pub dry_run: bool,

  /// Skip ingredients that cannot be built instead of aborting
  #[arg(long)]
  pub proceed: bool,
}

pub fn cmd_cook(
  config: &Config,
  recipe: &RecipeArgs,
  host: &HostArgs,
  args: &CookArgs,
  output: OutputFormat,
) -> Result<()> {
  let host = host.host()?;
  let managers = if args.dry_run {
    ManagerRegistry::dry_run(["apt", "bash"])
  } else {
    ManagerRegistry::system()
  };
  let kitchen = kitchen(config, host, recipe, managers)?;

  let policy = if args.proceed { IssueDecision::Proceed } else { config.policy };
  info!(policy = %policy, dry_run = args.dry_run, "cooking recipe");

  let handler = |problems: &[Problem]| {
    for problem in problems {
      print_warning(&problem.to_string());
    }
    policy
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = match rt.block_on(kitchen.cook(handler)) {
    Ok(report) => report,
    Err(err) => {
      if let KitchenError::Execute(e) = &err
        && let Some(captured) = e.output()
      {
        print_error(captured);
      }
      return Err(err).context("Cooking failed");
    }
  };

  if output.is_json() {
    return print_json(&report);
  }
  print_report(&report, args.dry_run);
  Ok(())
}

fn print_report(report: &CookReport, dry_run: bool) {
  for record in &report.execution.records {
    let target = record.target.as_deref().unwrap_or("-");
    match &record.outcome {
      Outcome::Installed { output } if dry_run => print_info(output),
      Outcome::Installed { .. } => print_success(&format!("{} ({})", record.name, target)),
      Outcome::AlreadyPresent => print_info(&format!("{} already present", record.name)),
      Outcome::Skipped { issue } => print_warning(&format!("{} skipped: {}", record.name, issue)),
    }
  }

  let verb = if dry_run { "Would install" } else { "Installed" };
  print_success(&format!(
    "{} {}",
    verb,
    plural(report.execution.installed(), "ingredient")
  ));
}
