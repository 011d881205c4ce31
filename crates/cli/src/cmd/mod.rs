//! Subcommand implementations and the arguments they share.

mod cook;
mod info;
mod list;
mod plan;
mod rules;
mod tree;

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Args;

use sous_lib::ingredient::Options;
use sous_lib::manager::ManagerRegistry;
use sous_lib::platform::paths;
use sous_lib::{Config, Host, Kitchen};

pub use cook::{CookArgs, cmd_cook};
pub use info::cmd_info;
pub use list::cmd_list;
pub use plan::cmd_plan;
pub use rules::cmd_rules;
pub use tree::cmd_tree;

/// Ingredients to work on.
#[derive(Args, Debug)]
pub struct RecipeArgs {
  /// Ingredients as `name` or `name@requirement`, e.g. `git` or `curl@^7.80`
  #[arg(required = true)]
  pub ingredients: Vec<String>,

  /// Option passed to every requested ingredient (repeatable)
  #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_option)]
  pub options: Vec<(String, String)>,
}

/// Overrides for the detected host.
#[derive(Args, Debug)]
pub struct HostArgs {
  /// Platform to resolve for instead of the detected one (e.g. linux)
  #[arg(long)]
  pub os: Option<String>,

  /// Distribution to resolve for (e.g. ubuntu)
  #[arg(long)]
  pub distro: Option<String>,

  /// Distribution release to resolve for (e.g. 22.04)
  #[arg(long)]
  pub release: Option<String>,
}

impl HostArgs {
  /// The detected host with overrides applied.
  ///
  /// Overriding a level clears the levels below it.
  pub fn host(&self) -> Result<Host> {
    let mut host = Host::detect().context("Failed to detect host")?;
    if let Some(os) = &self.os {
      host.os = os.clone();
      host.distribution = None;
      host.release = None;
    }
    if let Some(distro) = &self.distro {
      host.distribution = Some(distro.clone());
      host.release = None;
    }
    if let Some(release) = &self.release {
      if host.distribution.is_none() {
        bail!("--release requires a distribution (pass --distro)");
      }
      host.release = Some(release.clone());
    }
    Ok(host)
  }
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
  match raw.split_once('=') {
    Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
    _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
  }
}

/// Load `path`, or discover the configuration file when none is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
  match path {
    Some(path) => Config::load(path).with_context(|| format!("Failed to load config: {}", path.display())),
    None => Config::load_or_default(&paths::config_file()).context("Failed to load config"),
  }
}

/// A kitchen for `host` with the recipe declared.
fn kitchen(config: &Config, host: Host, recipe: &RecipeArgs, managers: ManagerRegistry) -> Result<Kitchen> {
  let mut kitchen = Kitchen::from_config(host, config, managers);
  let options: Options = recipe.options.iter().cloned().collect();
  for spec in &recipe.ingredients {
    kitchen
      .ingredient_with(spec, options.clone())
      .with_context(|| format!("Invalid ingredient: {}", spec))?;
  }
  Ok(kitchen)
}
