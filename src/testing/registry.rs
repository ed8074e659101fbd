//! Scenario registry
//!
//! The runner builds one registry, registers every scenario it knows about
//! and runs them, optionally on a Rayon pool. Results come back in
//! registration order either way.

use rayon::prelude::*;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::report::RunReport;
use super::result::ScenarioResult;

type ScenarioFn = Box<dyn Fn() -> ScenarioResult + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("scenario '{0}' is already registered")]
    DuplicateScenario(String),
}

/// Options for a registry run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only run scenarios whose name contains this string
    pub filter: Option<String>,
    /// Number of threads (0 = sequential)
    pub parallel: usize,
}

struct RegisteredScenario {
    name: String,
    run: ScenarioFn,
}

/// Named scenarios, in registration order
#[derive(Default)]
pub struct ScenarioRegistry {
    scenarios: Vec<RegisteredScenario>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, run: F) -> Result<(), RegistryError>
    where
        F: Fn() -> ScenarioResult + Send + Sync + 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(RegistryError::DuplicateScenario(name));
        }
        debug!("Registered scenario '{}'", name);
        self.scenarios.push(RegisteredScenario {
            name,
            run: Box::new(run),
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenarios.iter().any(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|s| s.name.as_str())
    }

    /// Run every scenario matching the filter
    pub fn run(&self, options: &RunOptions) -> RunReport {
        let selected: Vec<&RegisteredScenario> = self
            .scenarios
            .iter()
            .filter(|s| match &options.filter {
                Some(f) => s.name.contains(f.as_str()),
                None => true,
            })
            .collect();

        info!(
            "Running {} of {} scenarios ({})",
            selected.len(),
            self.scenarios.len(),
            if options.parallel > 0 {
                format!("{} threads", options.parallel)
            } else {
                "sequential".to_string()
            }
        );

        let started_at = chrono::Utc::now();
        let clock = Instant::now();
        let results = if options.parallel > 0 {
            run_parallel(&selected, options.parallel)
        } else {
            selected.iter().map(|s| run_one(s)).collect()
        };

        RunReport::new(started_at, clock.elapsed().as_secs_f64(), results)
    }
}

/// Results carry the registry key so names stay unique within a run
fn run_one(scenario: &RegisteredScenario) -> ScenarioResult {
    let result = (scenario.run)().renamed(scenario.name.as_str());
    debug!(
        "Scenario '{}' {} in {:.6}s",
        scenario.name,
        if result.passed() { "passed" } else { "failed" },
        result.duration_secs()
    );
    result
}

fn run_parallel(selected: &[&RegisteredScenario], threads: usize) -> Vec<ScenarioResult> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(|| selected.par_iter().map(|s| run_one(s)).collect()),
        Err(e) => {
            warn!("Failed to build thread pool ({}), running sequentially", e);
            selected.iter().map(|s| run_one(s)).collect()
        }
    }
}
