//! Scoped scenario execution
//!
//! `Scenario::run` owns the timer and the result for one scenario. Steps run
//! through the context; a failing or panicking step is recorded against its
//! phase and never escapes the scenario.

use std::any::Any;
use std::cell::Cell;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, warn};

use super::assertions::AssertionError;
use super::result::{Phase, ScenarioResult};

/// Why a step failed
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Assertion(#[from] AssertionError),
    #[error("{0}")]
    Failed(String),
    #[error("panicked: {0}")]
    Panicked(String),
}

impl StepError {
    pub fn failed(reason: impl Display) -> Self {
        StepError::Failed(reason.to_string())
    }
}

/// Entry point for running a scenario
pub struct Scenario;

impl Scenario {
    /// Run `body` with a fresh context and return the finished result.
    ///
    /// The timer is stopped on every exit path, including a panic raised by
    /// the body outside of a step.
    pub fn run(name: impl Into<String>, body: impl FnOnce(&mut ScenarioContext)) -> ScenarioResult {
        let _quiet = QuietPanics::enter();
        let mut ctx = ScenarioContext::new(name.into());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut ctx)));
        ctx.finish(outcome.err())
    }
}

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Keeps the panic hook silent on this thread while a scenario runs. Caught
/// panics end up in the result, not on stderr in the middle of the report.
struct QuietPanics {
    previous: bool,
}

impl QuietPanics {
    fn enter() -> Self {
        QUIET_HOOK.call_once(|| {
            let hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if !QUIET_PANICS.with(Cell::get) {
                    hook(info);
                }
            }));
        });
        Self {
            previous: QUIET_PANICS.with(|quiet| quiet.replace(true)),
        }
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        QUIET_PANICS.with(|quiet| quiet.set(self.previous));
    }
}

/// Handle passed to a scenario body
pub struct ScenarioContext {
    result: ScenarioResult,
    phase: Phase,
}

impl ScenarioContext {
    fn new(name: String) -> Self {
        let mut result = ScenarioResult::new(name);
        if let Err(e) = result.start_timer() {
            warn!("Could not start timer: {}", e);
        }
        Self {
            result,
            phase: Phase::Given,
        }
    }

    pub fn name(&self) -> &str {
        self.result.name()
    }

    /// Run a setup step. Returns `None` if it failed.
    pub fn given<T>(&mut self, name: &str, step: impl FnOnce() -> Result<T, StepError>) -> Option<T> {
        self.step(Phase::Given, name, step)
    }

    /// Run an action step. Returns `None` if it failed.
    pub fn when<T>(&mut self, name: &str, step: impl FnOnce() -> Result<T, StepError>) -> Option<T> {
        self.step(Phase::When, name, step)
    }

    /// Run an assertion step. Returns whether it passed.
    pub fn then(&mut self, name: &str, step: impl FnOnce() -> Result<(), StepError>) -> bool {
        self.step(Phase::Then, name, step).is_some()
    }

    /// Attach output to the most recent step
    pub fn output(&mut self, text: impl AsRef<str>) {
        if let Err(e) = self.result.capture_output(self.phase, text.as_ref()) {
            warn!("Dropped output for '{}': {}", self.result.name(), e);
        }
    }

    fn step<T>(&mut self, phase: Phase, name: &str, step: impl FnOnce() -> Result<T, StepError>) -> Option<T> {
        self.phase = phase;
        debug!(scenario = self.result.name(), %phase, step = name, "running step");

        let outcome = match panic::catch_unwind(AssertUnwindSafe(step)) {
            Ok(outcome) => outcome,
            Err(payload) => Err(StepError::Panicked(panic_message(payload.as_ref()))),
        };

        let (value, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(e) => {
                debug!(scenario = self.result.name(), %phase, step = name, "step failed: {}", e);
                (None, Some(e.to_string()))
            }
        };

        if let Err(e) = self.result.record_check(phase, name, error) {
            warn!("Could not record '{}': {}", name, e);
        }
        value
    }

    fn finish(mut self, panic_payload: Option<Box<dyn Any + Send>>) -> ScenarioResult {
        if let Some(payload) = panic_payload {
            let error = StepError::Panicked(panic_message(payload.as_ref()));
            let phase = self.phase;
            if let Err(e) = self.result.record_check(phase, "scenario body", Some(error.to_string())) {
                warn!("Could not record scenario panic: {}", e);
            }
        }
        if let Err(e) = self.result.stop_timer() {
            warn!("Could not stop timer: {}", e);
        }
        self.result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assertions::expect_eq;

    #[test]
    fn test_passing_scenario() {
        let result = Scenario::run("adds", |ctx| {
            let Some(a) = ctx.given("a number", || Ok(2)) else {
                return;
            };
            let Some(sum) = ctx.when("it is doubled", || Ok(a + a)) else {
                return;
            };
            ctx.then("the sum is four", || Ok(expect_eq("sum", sum, 4)?));
        });

        assert!(result.passed());
        assert!(result.is_finalized());
        assert_eq!(result.step_count(), 3);
        assert!(result.duration().is_ok());
    }

    #[test]
    fn test_failed_given_skips_dependent_steps() {
        let result = Scenario::run("no setup", |ctx| {
            let Some(_value) = ctx.given::<u32>("a value", || Err(StepError::failed("nothing"))) else {
                return;
            };
            ctx.then("never runs", || Ok(()));
        });

        assert!(!result.passed());
        assert_eq!(result.step_count(), 1);
        assert_eq!(result.errors(Phase::Given).collect::<Vec<_>>(), vec![Some("nothing")]);
    }

    #[test]
    fn test_failing_check_does_not_stop_later_checks() {
        let result = Scenario::run("two checks", |ctx| {
            ctx.then("fails", || Ok(expect_eq("x", 1, 2)?));
            ctx.then("passes", || Ok(()));
        });

        assert!(!result.passed());
        let names: Vec<_> = result.names(Phase::Then).collect();
        assert_eq!(names, vec!["fails", "passes"]);
        assert_eq!(result.failures().len(), 1);
    }

    #[test]
    fn test_panicking_step_is_recorded() {
        let result = Scenario::run("panics", |ctx| {
            ctx.then("asserts", || {
                assert_eq!(1, 2, "numbers differ");
                Ok(())
            });
            ctx.then("still runs", || Ok(()));
        });

        assert!(!result.passed());
        let error = result.errors(Phase::Then).next().flatten().unwrap();
        assert!(error.starts_with("panicked:"));
        assert!(error.contains("numbers differ"));
        assert_eq!(result.step_count(), 2);
    }

    #[test]
    fn test_panicking_body_still_finalizes() {
        let result = Scenario::run("body panics", |ctx| {
            ctx.when("acts", || Ok(()));
            panic!("outside any step");
        });

        assert!(result.is_finalized());
        assert!(!result.passed());
        let failures = result.failures();
        assert_eq!(failures[0].0, Phase::When);
        assert_eq!(failures[0].1.name, "scenario body");
    }

    #[test]
    fn test_output_attaches_to_last_step() {
        let result = Scenario::run("output", |ctx| {
            ctx.given("setup", || Ok(()));
            ctx.output("rolled 20 balls");
            ctx.output("all gutters");
        });

        let output: Vec<_> = result.output(Phase::Given).collect();
        assert_eq!(output, vec!["rolled 20 balls\nall gutters"]);
    }

    #[test]
    fn test_panics_quiet_only_inside_scenario() {
        assert!(!QUIET_PANICS.with(Cell::get));
        let result = Scenario::run("outer", |ctx| {
            ctx.then("quiet while running", || {
                expect_eq("quiet", QUIET_PANICS.with(Cell::get), true)?;
                Ok(())
            });
            let inner = Scenario::run("inner", |ctx| {
                ctx.then("panics", || panic!("inner panic"));
            });
            ctx.then("still quiet after a nested run", || {
                expect_eq("inner failed", inner.passed(), false)?;
                expect_eq("quiet", QUIET_PANICS.with(Cell::get), true)?;
                Ok(())
            });
        });
        assert!(result.passed(), "{:?}", result.failures());
        assert!(!QUIET_PANICS.with(Cell::get));
    }
}
