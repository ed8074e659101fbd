//! Runner configuration
//!
//! Priority: command line > local settings > template settings > defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::constants::{RUNNER_SETTINGS_FILE, RUNNER_SETTINGS_TEMPLATE, SCENARIOS_DIR};

pub const USAGE: &str = "\
Usage: givenspec [FILTER] [OPTIONS]

Runs the built-in bowling scenarios and every TOML scenario under the
scenarios directory. Exits 0 if all scenarios pass, 1 otherwise.

Options:
  -v, --verbose        Show full failure details and captured output
  -q, --quiet          Do not print the report
      --dir <PATH>     Scenario directory (default: tests/scenarios)
      --parallel <N>   Run scenarios on N threads (0 = sequential)
      --json <PATH>    Write a JSON report
      --db <PATH>      Append results to a SQLite history database
      --no-builtin     Skip the built-in bowling scenarios
      --history <NAME> Show stored results for a scenario (needs --db)
      --settings <P>   Load settings from a JSON file
      --debug-log      Enable debug logging
  -h, --help           Show this message";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("{0} requires a value")]
    MissingValue(String),
    #[error("Invalid value '{value}' for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("Unknown option '{0}'")]
    UnknownOption(String),
}

/// Configuration for a scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory searched for TOML scenario files
    pub scenarios_dir: String,
    /// Only run scenarios whose name contains this string
    pub filter: Option<String>,
    /// Show full failure details
    pub verbose: bool,
    /// Number of parallel threads (0 = sequential)
    pub parallel: usize,
    /// JSON report path (None = no report file)
    pub json_output: Option<String>,
    /// Path to SQLite database for storing results
    pub db_path: Option<String>,
    /// Include the built-in bowling scenarios
    pub builtin: bool,
    /// Suppress the console report
    pub quiet: bool,
    /// Show stored history for this scenario instead of running
    #[serde(skip)]
    pub history: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scenarios_dir: SCENARIOS_DIR.to_string(),
            filter: None,
            verbose: false,
            parallel: 0, // Sequential by default
            json_output: None,
            db_path: None,
            builtin: true,
            quiet: false,
            history: None,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a JSON settings file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load configuration from default config files
    pub fn from_config_files() -> Self {
        // Try local settings first
        if let Ok(config) = Self::from_file(Path::new(RUNNER_SETTINGS_FILE)) {
            return config;
        }
        // Fall back to template settings
        if let Ok(config) = Self::from_file(Path::new(RUNNER_SETTINGS_TEMPLATE)) {
            return config;
        }
        Self::default()
    }

    /// Parse command line arguments (program name first) on top of the
    /// config files, or on top of an explicit `--settings` file
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let base = match settings_override(args)? {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::from_config_files(),
        };
        base.apply_args(args)
    }

    /// Apply command line arguments over this configuration
    pub fn apply_args(mut self, args: &[String]) -> Result<Self, ConfigError> {
        let mut i = 1;
        while i < args.len() {
            let arg = args[i].as_str();
            match arg {
                "--verbose" | "-v" => self.verbose = true,
                "--quiet" | "-q" => self.quiet = true,
                "--no-builtin" => self.builtin = false,
                "--debug-log" | "--help" | "-h" => {}
                "--dir" => {
                    self.scenarios_dir = value_for(args, i)?.to_string();
                    i += 1;
                }
                "--parallel" => {
                    let value = value_for(args, i)?;
                    self.parallel = value.parse().map_err(|_| ConfigError::InvalidValue {
                        flag: arg.to_string(),
                        value: value.to_string(),
                    })?;
                    i += 1;
                }
                "--json" => {
                    self.json_output = Some(value_for(args, i)?.to_string());
                    i += 1;
                }
                "--history" => {
                    self.history = Some(value_for(args, i)?.to_string());
                    i += 1;
                }
                "--db" => {
                    self.db_path = Some(value_for(args, i)?.to_string());
                    i += 1;
                }
                "--settings" => {
                    // Already applied by from_args
                    value_for(args, i)?;
                    i += 1;
                }
                _ if arg.starts_with('-') => return Err(ConfigError::UnknownOption(arg.to_string())),
                _ => self.filter = Some(arg.to_string()),
            }
            i += 1;
        }
        Ok(self)
    }
}

pub fn help_requested(args: &[String]) -> bool {
    args.iter().skip(1).any(|a| a == "--help" || a == "-h")
}

fn settings_override(args: &[String]) -> Result<Option<&str>, ConfigError> {
    match args.iter().position(|a| a == "--settings") {
        Some(i) => value_for(args, i).map(Some),
        None => Ok(None),
    }
}

fn value_for(args: &[String], flag_idx: usize) -> Result<&str, ConfigError> {
    args.get(flag_idx + 1)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingValue(args[flag_idx].clone()))
}
