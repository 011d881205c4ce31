//! Command execution shared by the process-backed package managers.
//!
//! Commands run with a cleared environment: only `PATH`, `HOME` and a `C`
//! locale are inherited, everything else comes from the caller.

use std::collections::BTreeMap;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info};

use super::types::ManagerError;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Run `program` with `args` and `env`, capturing its output.
///
/// A non-zero exit becomes [`ManagerError::CommandFailed`] carrying stderr
/// followed by stdout. The child is killed if the returned future is dropped,
/// so callers can bound it with a timeout.
pub async fn run_command(
  program: &str,
  args: &[String],
  env: &BTreeMap<String, String>,
) -> Result<CommandOutput, ManagerError> {
  let cmd = display_command(program, args);
  info!(cmd = %cmd, "executing command");

  let mut command = Command::new(program);
  command
    .args(args)
    .env_clear()
    .env("PATH", std::env::var_os("PATH").unwrap_or_default())
    .env("HOME", std::env::var_os("HOME").unwrap_or_default())
    .env("LANG", "C")
    .env("LC_ALL", "C")
    .kill_on_drop(true);

  for (key, value) in env {
    command.env(key, value);
  }

  let output = command.output().await.map_err(|source| match source.kind() {
    std::io::ErrorKind::NotFound => ManagerError::NotFound {
      program: program.to_string(),
    },
    _ => ManagerError::Spawn {
      program: program.to_string(),
      source,
    },
  })?;

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

  if !output.status.success() {
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }

    let captured = [stderr, stdout]
      .into_iter()
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join("\n");

    return Err(ManagerError::CommandFailed {
      cmd,
      code: output.status.code(),
      output: captured,
    });
  }

  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }

  Ok(CommandOutput { stdout, stderr })
}

/// Extract a version from the first line of `output` using capture group 1
/// of `pattern`.
pub fn parse_version(output: &str, pattern: &Regex) -> Option<String> {
  let first_line = output.lines().next()?;
  pattern
    .captures(first_line)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().to_string())
}

fn display_command(program: &str, args: &[String]) -> String {
  std::iter::once(program)
    .chain(args.iter().map(String::as_str))
    .collect::<Vec<_>>()
    .join(" ")
}
