use std::fmt;

/// Operating system families with known platform ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
  FreeBsd,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    Self::from_target(std::env::consts::OS)
  }

  fn from_target(os: &str) -> Option<Self> {
    match os {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      "freebsd" => Some(Self::FreeBsd),
      _ => None,
    }
  }

  /// Returns the platform id ingredients declare rules for
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
      Self::FreeBsd => "freebsd",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Returns the platform id of the running system.
///
/// Unknown targets fall back to the raw `std::env::consts::OS` value.
pub fn platform_id() -> String {
  Os::current()
    .map(|os| os.as_str().to_string())
    .unwrap_or_else(|| std::env::consts::OS.to_string())
}
