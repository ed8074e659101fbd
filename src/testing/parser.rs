//! TOML scenario file parsing and discovery

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Complete scenario definition from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    pub description: Option<String>,
    pub given: GivenStep,
    #[serde(default)]
    pub when: WhenStep,
    #[serde(default)]
    pub then: Vec<ThenStep>,
}

/// Setup: the rolls of the game under test
#[derive(Debug, Clone, Deserialize)]
pub struct GivenStep {
    pub step: String,
    #[serde(default)]
    pub rolls: Vec<u32>,
}

/// Action applied to the game
#[derive(Debug, Clone, Deserialize)]
pub struct WhenStep {
    #[serde(default = "default_when_step")]
    pub step: String,
}

impl Default for WhenStep {
    fn default() -> Self {
        Self {
            step: default_when_step(),
        }
    }
}

fn default_when_step() -> String {
    "the score is calculated".to_string()
}

/// Assertion step: every check must hold
#[derive(Debug, Clone, Deserialize)]
pub struct ThenStep {
    pub step: String,
    #[serde(default)]
    pub checks: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Parse a scenario from TOML text
pub fn parse_scenario_str(content: &str) -> Result<ScenarioDefinition, toml::de::Error> {
    toml::from_str(content)
}

/// Parse a scenario file from path
pub fn parse_scenario_file(path: &Path) -> Result<ScenarioDefinition, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.display().to_string(),
        source,
    })?;

    parse_scenario_str(&content).map_err(|source| ParseError::Toml {
        path: path.display().to_string(),
        source,
    })
}

/// Collect `*.toml` files under `base`, sorted, keeping those whose relative
/// path contains `filter`
pub fn discover_scenarios(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    discover_recursive(base, base, filter, &mut found);
    found.sort();
    found
}

fn discover_recursive(base: &Path, current: &Path, filter: Option<&str>, found: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(current) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            discover_recursive(base, &path, filter, found);
        } else if path.extension().map(|e| e == "toml").unwrap_or(false) {
            if let Some(f) = filter {
                let rel = path.strip_prefix(base).unwrap_or(&path).to_string_lossy();
                if !rel.contains(f) {
                    continue;
                }
            }
            found.push(path);
        }
    }
}

/// Registry key for a scenario file: its path relative to `base`, without extension
pub fn scenario_key(base: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path).with_extension("");
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
