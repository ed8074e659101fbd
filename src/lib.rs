//! givenspec - given/when/then scenario results and a bowling scorer
//!
//! `testing` records named checks per phase into a `ScenarioResult` and runs
//! scenarios from a runner-owned registry. `scoring` is the bowling game the
//! bundled scenarios exercise.

pub mod config;
pub mod constants;
pub mod logging;
pub mod scoring;
pub mod testing;

// Re-export commonly used types for convenience
pub use config::{ConfigError, RunnerConfig};
pub use logging::LogConfig;
pub use scoring::{BowlingGame, FrameKind, FrameScore, ScoreError, Scorecard, register_bowling_specs, roll_game};
pub use testing::{
    CheckRecord, Phase, RegistryError, ResultError, RunOptions, RunReport, Scenario, ScenarioContext,
    ScenarioRegistry, ScenarioResult, StepError,
};
