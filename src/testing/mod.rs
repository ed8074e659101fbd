//! Given/when/then scenario support
//!
//! Scenarios run through a `ScenarioContext` that records every step into a
//! `ScenarioResult`. A runner-owned `ScenarioRegistry` runs them and produces
//! a `RunReport`. Bowling scenarios can also be written as TOML files.

pub mod assertions;
pub mod db;
pub mod parser;
pub mod registry;
pub mod report;
pub mod result;
pub mod runner;
pub mod scenario;

pub use assertions::{AssertionError, check_comparison, expect_eq, expect_ne, parse_check};
pub use db::ResultDatabase;
pub use parser::{ScenarioDefinition, discover_scenarios, parse_scenario_file};
pub use registry::{RegistryError, RunOptions, ScenarioRegistry};
pub use report::{RunReport, RunSummary, print_report, render_report};
pub use result::{CheckRecord, Phase, ResultError, ScenarioResult};
pub use runner::{register_scenario_files, run_definition};
pub use scenario::{Scenario, ScenarioContext, StepError};
