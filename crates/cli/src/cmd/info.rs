//! `sous info`: the detected host and the active configuration.

use anyhow::{Context, Result};
use serde::Serialize;

use sous_lib::platform::paths;
use sous_lib::{Config, Host};

use crate::output::{OutputFormat, print_info, print_json, print_stat};

#[derive(Serialize)]
struct InfoOutput<'a> {
  host: &'a Host,
  config_path: String,
  ingredients: usize,
  action_timeout_secs: Option<u64>,
  verify: bool,
  policy: String,
}

pub fn cmd_info(config: &Config, output: OutputFormat) -> Result<()> {
  let host = Host::detect().context("Failed to detect host")?;
  let ingredients = sous_lib::registry::Registry::with_builtins(config.catalog()).names().len();
  let info = InfoOutput {
    host: &host,
    config_path: paths::config_file().display().to_string(),
    ingredients,
    action_timeout_secs: config.action_timeout_secs,
    verify: config.verify,
    policy: config.policy.to_string(),
  };

  if output.is_json() {
    return print_json(&info);
  }

  print_info(&format!("Host: {}", host));
  print_stat("Platform", &host.os);
  print_stat("Distribution", host.distribution().unwrap_or("-"));
  print_stat("Release", host.release().unwrap_or("-"));
  let managers: Vec<&str> = host.managers.iter().map(String::as_str).collect();
  print_stat(
    "Package managers",
    &if managers.is_empty() { "-".to_string() } else { managers.join(", ") },
  );
  println!();
  print_info(&format!("Config: {}", info.config_path));
  print_stat("Ingredients", &info.ingredients.to_string());
  print_stat(
    "Action timeout",
    &info
      .action_timeout_secs
      .map(|s| format!("{}s", s))
      .unwrap_or_else(|| "none".to_string()),
  );
  print_stat("Verify", &info.verify.to_string());
  print_stat("Policy", &info.policy);

  Ok(())
}
