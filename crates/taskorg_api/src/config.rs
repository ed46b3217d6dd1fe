//! Runtime configuration resolved from the environment.

use std::path::PathBuf;

/// Database file path override.
pub const DB_PATH_ENV: &str = "TASKORG_DB_PATH";
/// Log level override (`trace|debug|info|warn|error`).
pub const LOG_LEVEL_ENV: &str = "TASKORG_LOG_LEVEL";
/// Absolute log directory; logs go to stderr when unset.
pub const LOG_DIR_ENV: &str = "TASKORG_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "taskorg.sqlite3";

/// Resolved API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl ApiConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV)
                .unwrap_or_else(|| taskorg_core::default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
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
    fn defaults_apply_when_unset_or_blank() {
        let config = ApiConfig::from_lookup(lookup(&[(DB_PATH_ENV, "   ")]));
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("taskorg.sqlite3")
        );
        assert_eq!(config.log_level, taskorg_core::default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn environment_values_are_trimmed() {
        let config = ApiConfig::from_lookup(lookup(&[
            (DB_PATH_ENV, " /var/lib/taskorg/data.sqlite3 "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/taskorg"),
        ]));
        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/taskorg/data.sqlite3")
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/taskorg")));
    }

    #[test]
    fn explicit_db_path_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[])).with_db_path("/tmp/x.sqlite3");
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.sqlite3"));
    }
}
