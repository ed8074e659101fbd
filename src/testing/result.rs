//! Scenario result bookkeeping
//!
//! A `ScenarioResult` collects named check outcomes per phase and times the
//! scenario with wall-clock UTC timestamps. It is append-only while running
//! and read-only once the timer is stopped.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Stage of a given/when/then scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Setup
    Given,
    /// Action
    When,
    /// Assertion
    Then,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Given, Phase::When, Phase::Then];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Given => "given",
            Phase::When => "when",
            Phase::Then => "then",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from misusing a result's lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
    #[error("timer was never started")]
    TimerNotStarted,
    #[error("timer was never stopped")]
    TimerNotStopped,
    #[error("scenario '{0}' is finalized")]
    Finalized(String),
    #[error("no check recorded in the {0} phase")]
    NoCheckRecorded(Phase),
}

/// One recorded check: its name, error slot and captured output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub name: String,
    /// `None` or an empty string means the check passed
    pub error: Option<String>,
    #[serde(default)]
    pub output: String,
}

impl CheckRecord {
    pub fn passed(&self) -> bool {
        self.error.as_deref().is_none_or(str::is_empty)
    }
}

/// Outcome of one scenario evaluation
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    name: String,
    phases: BTreeMap<Phase, Vec<CheckRecord>>,
    started: Option<DateTime<Utc>>,
    stopped: Option<DateTime<Utc>>,
}

impl ScenarioResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phases: Phase::ALL.iter().map(|&p| (p, Vec::new())).collect(),
            started: None,
            stopped: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same result under another name. Recorded checks and timing are kept.
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Start (or restart) the timer. Fails once the result is finalized.
    pub fn start_timer(&mut self) -> Result<(), ResultError> {
        self.ensure_open()?;
        self.started = Some(Utc::now());
        Ok(())
    }

    /// Stop the timer and finalize the result
    pub fn stop_timer(&mut self) -> Result<(), ResultError> {
        self.ensure_open()?;
        if self.started.is_none() {
            return Err(ResultError::TimerNotStarted);
        }
        self.stopped = Some(Utc::now());
        Ok(())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started
    }

    pub fn stopped_at(&self) -> Option<DateTime<Utc>> {
        self.stopped
    }

    pub fn is_finalized(&self) -> bool {
        self.stopped.is_some()
    }

    /// Elapsed time between start and stop
    pub fn duration(&self) -> Result<Duration, ResultError> {
        let started = self.started.ok_or(ResultError::TimerNotStarted)?;
        let stopped = self.stopped.ok_or(ResultError::TimerNotStopped)?;
        // Wall clocks can step backwards
        Ok((stopped - started).max(Duration::zero()))
    }

    /// Duration in seconds, 0.0 while the timer is incomplete
    pub fn duration_secs(&self) -> f64 {
        self.duration()
            .ok()
            .and_then(|d| d.num_microseconds())
            .map(|us| us as f64 / 1_000_000.0)
            .unwrap_or(0.0)
    }

    /// Append a check outcome to a phase
    pub fn record_check(
        &mut self,
        phase: Phase,
        name: impl Into<String>,
        error: Option<String>,
    ) -> Result<(), ResultError> {
        self.ensure_open()?;
        self.phases.entry(phase).or_default().push(CheckRecord {
            name: name.into(),
            error,
            output: String::new(),
        });
        Ok(())
    }

    /// Append captured output to the most recent check of a phase
    pub fn capture_output(&mut self, phase: Phase, text: &str) -> Result<(), ResultError> {
        self.ensure_open()?;
        let record = self
            .phases
            .get_mut(&phase)
            .and_then(|checks| checks.last_mut())
            .ok_or(ResultError::NoCheckRecorded(phase))?;
        if !record.output.is_empty() && !record.output.ends_with('\n') {
            record.output.push('\n');
        }
        record.output.push_str(text);
        Ok(())
    }

    /// True iff no recorded check carries a non-empty error
    pub fn passed(&self) -> bool {
        self.checks().all(|(_, check)| check.passed())
    }

    pub fn phase(&self, phase: Phase) -> &[CheckRecord] {
        self.phases.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self, phase: Phase) -> impl Iterator<Item = &str> {
        self.phase(phase).iter().map(|c| c.name.as_str())
    }

    pub fn errors(&self, phase: Phase) -> impl Iterator<Item = Option<&str>> {
        self.phase(phase).iter().map(|c| c.error.as_deref())
    }

    pub fn output(&self, phase: Phase) -> impl Iterator<Item = &str> {
        self.phase(phase).iter().map(|c| c.output.as_str())
    }

    /// All checks in phase order
    pub fn checks(&self) -> impl Iterator<Item = (Phase, &CheckRecord)> {
        self.phases
            .iter()
            .flat_map(|(&phase, checks)| checks.iter().map(move |c| (phase, c)))
    }

    pub fn failures(&self) -> Vec<(Phase, &CheckRecord)> {
        self.checks().filter(|(_, c)| !c.passed()).collect()
    }

    pub fn step_count(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    fn ensure_open(&self) -> Result<(), ResultError> {
        if self.is_finalized() {
            return Err(ResultError::Finalized(self.name.clone()));
        }
        Ok(())
    }
}
