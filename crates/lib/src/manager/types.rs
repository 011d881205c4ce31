//! Error types for package-manager backends.

use thiserror::Error;

/// Errors reported by a package manager.
#[derive(Debug, Error)]
pub enum ManagerError {
  /// The manager's executable is not on `PATH`.
  #[error("{program} not found on PATH")]
  NotFound { program: String },

  /// The process could not be started.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The process exited unsuccessfully.
  #[error("{cmd} failed with exit code {code:?}{}", format_output(.output))]
  CommandFailed {
    cmd: String,
    code: Option<i32>,
    output: String,
  },

  /// The version output did not match the expected pattern.
  #[error("could not parse {program} version from: {output}")]
  VersionUnparsable { program: String, output: String },
}

impl ManagerError {
  /// Captured diagnostic output of a failed command, if any.
  pub fn output(&self) -> Option<&str> {
    match self {
      Self::CommandFailed { output, .. } if !output.is_empty() => Some(output),
      _ => None,
    }
  }
}

fn format_output(output: &str) -> String {
  if output.is_empty() {
    String::new()
  } else {
    format!(":\n{}", output)
  }
}
