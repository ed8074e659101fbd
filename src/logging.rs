//! Logging configuration shared across binaries.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::constants::LOG_SETTINGS_FILE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
    pub show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            show_target: false,
        }
    }
}

impl LogConfig {
    pub fn load() -> Self {
        Self::load_from(Path::new(LOG_SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn enabled_from_args(args: &[String]) -> bool {
        args.iter().any(|arg| arg == "--debug-log")
    }

    pub fn load_with_args(args: &[String]) -> Self {
        let mut config = Self::load();
        if Self::enabled_from_args(args) {
            config.level = "debug".to_string();
        }
        config
    }

    /// Install the global subscriber. Logs go to stderr; RUST_LOG wins over
    /// the configured level. A second call is a no-op.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(self.show_target)
                    .without_time(),
            )
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag() {
        let args = vec!["givenspec".to_string(), "--debug-log".to_string()];
        assert!(LogConfig::enabled_from_args(&args));
        assert_eq!(LogConfig::load_with_args(&args).level, "debug");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = LogConfig::load_from(Path::new("does/not/exist.json"));
        assert_eq!(config.level, "warn");
        assert!(!config.show_target);
    }

    #[test]
    fn test_partial_json() {
        let config: LogConfig = serde_json::from_str(r#"{ "level": "info" }"#).unwrap();
        assert_eq!(config.level, "info");
        assert!(!config.show_target);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LogConfig::default();
        config.init();
        config.init();
    }
}
