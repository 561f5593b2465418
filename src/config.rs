use std::env;
use std::path::PathBuf;

use tracing::Level;

pub const DIR_ENV: &str = "TASKSTATE_DIR";
pub const LOG_ENV: &str = "TASKSTATE_LOG";
pub const LOG_FILE: &str = "taskstate.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub todo_key: String,
    pub tasks_key: String,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            todo_key: "todos".to_string(),
            tasks_key: "tasks".to_string(),
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Command-line values win over the environment, which wins over the
    /// defaults. An unparseable level falls back to the next source.
    pub fn resolve(data_dir: Option<PathBuf>, log_level: Option<&str>) -> Self {
        Self::from_sources(data_dir, log_level, |name| env::var(name).ok())
    }

    pub fn from_sources(
        data_dir: Option<PathBuf>,
        log_level: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let defaults = Self::default();
        let data_dir = data_dir
            .or_else(|| env(DIR_ENV).map(PathBuf::from))
            .unwrap_or(defaults.data_dir);
        let log_level = log_level
            .and_then(|l| l.parse().ok())
            .or_else(|| env(LOG_ENV).and_then(|l| l.parse().ok()))
            .unwrap_or(defaults.log_level);
        Self {
            data_dir,
            log_level,
            ..defaults
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(None, None, no_env);
        assert_eq!(config, Config::default());
        assert_eq!(config.log_path(), PathBuf::from("./taskstate.log"));
    }

    #[test]
    fn env_fills_missing_flags() {
        let env = |name: &str| match name {
            DIR_ENV => Some("/tmp/board".to_string()),
            LOG_ENV => Some("debug".to_string()),
            _ => None,
        };
        let config = Config::from_sources(None, None, env);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/board"));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn flags_override_env() {
        let env = |_: &str| Some("trace".to_string());
        let config = Config::from_sources(Some("data".into()), Some("warn"), env);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    fn bad_level_falls_through() {
        let config = Config::from_sources(None, Some("loud"), no_env);
        assert_eq!(config.log_level, Level::INFO);
    }
}
