/// Application name used for configuration paths.
pub const APP_NAME: &str = "sous";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "SOUS_CONFIG";

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the bundled-scripts directory inside the data directory.
pub const SCRIPTS_DIR_NAME: &str = "scripts";

/// Location of the os-release file used for distribution detection.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Fallback location of the os-release file.
pub const OS_RELEASE_FALLBACK_PATH: &str = "/usr/lib/os-release";
