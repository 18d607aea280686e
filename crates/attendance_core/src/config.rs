//! Runtime configuration loaded from the environment.
//!
//! # Responsibility
//! - Resolve the storage file location and logging settings at startup.
//! - Optionally read a `.env` file next to the working directory.
//!
//! # Invariants
//! - Missing or blank variables fall back to defaults; loading never fails.

use crate::db::DEFAULT_DB_FILE_NAME;
use crate::logging::default_log_level;
use std::path::PathBuf;

/// Storage file path.
pub const DB_PATH_ENV: &str = "ATTENDANCE_DB_PATH";
/// Log level (`trace|debug|info|warn|error`).
pub const LOG_LEVEL_ENV: &str = "ATTENDANCE_LOG_LEVEL";
/// Absolute directory for rolling log files; file logging is off when unset.
pub const LOG_DIR_ENV: &str = "ATTENDANCE_LOG_DIR";

/// Startup configuration shared by the CLI and FFI shells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from process environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first so a `.env` file may supply values.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: non_blank(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: non_blank(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: non_blank(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.db_path, PathBuf::from("attendance.db"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn values_are_trimmed_and_blank_values_ignored() {
        let config = AppConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, "  /data/school.db "),
            (LOG_LEVEL_ENV, "   "),
            (LOG_DIR_ENV, "/var/log/attendance"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/data/school.db"));
        assert_eq!(config.log_level, AppConfig::default().log_level);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/attendance")));
    }
}
