use std::path::PathBuf;

use crate::consts::{APP_NAME, CONFIG_ENV, CONFIG_FILE_NAME, SCRIPTS_DIR_NAME};

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var_os("USERPROFILE").map(PathBuf::from).unwrap_or_default()
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default()
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> PathBuf {
  std::env::var_os("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(home_dir)
    .join(APP_NAME)
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
  let config_home = std::env::var("XDG_CONFIG_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".config"));
  config_home.join(APP_NAME)
}

/// Returns the directory for application data
#[cfg(windows)]
pub fn data_dir() -> PathBuf {
  std::env::var_os("LOCALAPPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(home_dir)
    .join(APP_NAME)
}

/// Returns the directory for application data
#[cfg(not(windows))]
pub fn data_dir() -> PathBuf {
  let data_home = std::env::var("XDG_DATA_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".local").join("share"));
  data_home.join(APP_NAME)
}

/// Where bundled install scripts are written before they run.
pub fn scripts_dir() -> PathBuf {
  data_dir().join(SCRIPTS_DIR_NAME)
}

/// Returns the configuration file path.
///
/// `SOUS_CONFIG` wins over the per-user configuration directory.
pub fn config_file() -> PathBuf {
  match std::env::var_os(CONFIG_ENV) {
    Some(path) if !path.is_empty() => PathBuf::from(path),
    _ => config_dir().join(CONFIG_FILE_NAME),
  }
}
