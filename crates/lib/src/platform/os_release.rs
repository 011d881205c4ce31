//! Minimal `os-release(5)` reader.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// The fields of an os-release file used for rule resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
  /// Lower-case distribution id (`ubuntu`, `debian`, `fedora`).
  pub id: Option<String>,
  /// Release id (`22.04`, `12`, `40`).
  pub version_id: Option<String>,
  /// Pretty name, for display only.
  pub pretty_name: Option<String>,
}

impl OsRelease {
  /// Parse os-release content.
  ///
  /// Unknown keys, comments and malformed lines are ignored.
  pub fn parse(content: &str) -> Self {
    let fields: BTreeMap<&str, String> = content
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty() && !line.starts_with('#'))
      .filter_map(|line| line.split_once('='))
      .map(|(key, value)| (key.trim(), unquote(value.trim())))
      .collect();

    let field = |key: &str| fields.get(key).filter(|v| !v.is_empty()).cloned();

    Self {
      id: field("ID").map(|id| id.to_lowercase()),
      version_id: field("VERSION_ID"),
      pretty_name: field("PRETTY_NAME"),
    }
  }

  /// Read and parse the file at `path`.
  pub fn load(path: &Path) -> io::Result<Self> {
    let content = std::fs::read_to_string(path)?;
    Ok(Self::parse(&content))
  }
}

fn unquote(value: &str) -> String {
  let stripped = value
    .strip_prefix('"')
    .and_then(|v| v.strip_suffix('"'))
    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
    .unwrap_or(value);
  stripped.replace("\\\"", "\"")
}
