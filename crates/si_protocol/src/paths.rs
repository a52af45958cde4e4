use std::path::PathBuf;

use crate::defaults::ENV_HOME;

/// Resolve the tool's home directory.
///
/// Priority:
/// 1) SI_HOME
/// 2) HOME/USERPROFILE
/// 3) ./.si
pub fn si_home() -> PathBuf {
    if let Ok(override_path) = std::env::var(ENV_HOME) {
        return PathBuf::from(override_path);
    }
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        return PathBuf::from(home).join(".si");
    }
    PathBuf::from(".").join(".si")
}

/// Default config file: ~/.si/config.toml
pub fn default_config_path() -> PathBuf {
    si_home().join("config.toml")
}

/// Default logs directory: ~/.si/logs
pub fn default_logs_dir() -> PathBuf {
    si_home().join("logs")
}
