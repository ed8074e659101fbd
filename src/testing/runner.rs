//! Scenario file execution
//!
//! Runs a parsed bowling scenario through the scenario context and registers
//! scenario files with a registry.

use std::path::Path;
use tracing::{info, warn};

use super::assertions::{AssertionError, check_comparison, check_word, expect_ne, parse_check};
use super::parser::{ScenarioDefinition, discover_scenarios, parse_scenario_file, scenario_key};
use super::registry::ScenarioRegistry;
use super::result::ScenarioResult;
use super::scenario::{Scenario, StepError};
use crate::scoring::{ScoreError, Scorecard, roll_game};

/// What the when step produced: a scorecard or the scoring error
pub type Outcome = Result<Scorecard, ScoreError>;

/// Run a single scenario definition and return its result
pub fn run_definition(def: &ScenarioDefinition) -> ScenarioResult {
    Scenario::run(def.name.clone(), |ctx| {
        let Some(rolls) = ctx.given(&def.given.step, || {
            expect_ne("roll count", def.given.rolls.len(), 0)?;
            Ok(def.given.rolls.clone())
        }) else {
            return;
        };
        ctx.output(format!("rolls: {:?}", rolls));

        let Some(outcome) = ctx.when(&def.when.step, || Ok(play(&rolls))) else {
            return;
        };
        match &outcome {
            Ok(card) => ctx.output(format!("score: {}", card.total)),
            Err(e) => ctx.output(format!("error: {}", e)),
        }

        for then in &def.then {
            ctx.then(&then.step, || evaluate_checks(&then.checks, &outcome));
        }
    })
}

/// Result for a scenario file that could not be loaded
pub fn load_failure(name: &str, message: &str) -> ScenarioResult {
    Scenario::run(name, |ctx| {
        ctx.given("the scenario file loads", || Err::<(), _>(StepError::failed(message)));
    })
}

fn play(rolls: &[u32]) -> Outcome {
    roll_game(rolls)?.scorecard()
}

/// Evaluate every check against an outcome, stopping at the first failure
pub fn evaluate_checks(checks: &[String], outcome: &Outcome) -> Result<(), StepError> {
    for check in checks {
        evaluate_check(check, outcome)?;
    }
    Ok(())
}

fn evaluate_check(check: &str, outcome: &Outcome) -> Result<(), AssertionError> {
    let (path, operator, expected) = parse_check(check).ok_or_else(|| AssertionError {
        message: format!("Invalid check syntax: {}", check),
        expected: "format: 'score = 300', 'frame.3 >= 20' or 'error = incomplete_game'".to_string(),
        actual: check.to_string(),
    })?;

    let parts: Vec<&str> = path.split('.').collect();
    match parts.as_slice() {
        ["error"] => {
            let actual = match outcome {
                Ok(_) => "none",
                Err(e) => e.kind(),
            };
            check_word(path, actual, operator, expected)
        }
        ["score"] => {
            let card = scorecard(check, outcome)?;
            check_comparison(path, i64::from(card.total), operator, expected)
        }
        ["frame", number] => {
            let card = scorecard(check, outcome)?;
            let frame: usize = number.parse().map_err(|_| AssertionError {
                message: format!("Invalid frame number in {}", check),
                expected: "frame number 1-10".to_string(),
                actual: number.to_string(),
            })?;
            let total = card.total_after(frame).ok_or_else(|| AssertionError {
                message: format!("Frame {} does not exist", frame),
                expected: "frame number 1-10".to_string(),
                actual: frame.to_string(),
            })?;
            check_comparison(path, i64::from(total), operator, expected)
        }
        _ => Err(AssertionError {
            message: format!("Unknown check target '{}'", path),
            expected: "score, frame.N or error".to_string(),
            actual: path.to_string(),
        }),
    }
}

fn scorecard<'a>(check: &str, outcome: &'a Outcome) -> Result<&'a Scorecard, AssertionError> {
    outcome.as_ref().map_err(|e| AssertionError {
        message: format!("Cannot evaluate '{}': game did not score", check),
        expected: "a scored game".to_string(),
        actual: e.to_string(),
    })
}

/// Discover scenario files under `base` and register each one.
///
/// Files that fail to parse are registered as failing scenarios so the run
/// reports them. Returns the number of files registered.
pub fn register_scenario_files(registry: &mut ScenarioRegistry, base: &Path) -> usize {
    let mut registered = 0;

    for path in discover_scenarios(base, None) {
        let key = scenario_key(base, &path);
        let result = match parse_scenario_file(&path) {
            Ok(def) => registry.register(key.clone(), move || run_definition(&def)),
            Err(e) => {
                warn!("{}", e);
                let message = e.to_string();
                let name = key.clone();
                registry.register(key.clone(), move || load_failure(&name, &message))
            }
        };

        match result {
            Ok(()) => registered += 1,
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    info!("Registered {} scenario files from {}", registered, base.display());
    registered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::parser::parse_scenario_str;
    use crate::testing::result::Phase;
    use crate::testing::registry::RunOptions;

    fn run_toml(toml: &str) -> ScenarioResult {
        run_definition(&parse_scenario_str(toml).unwrap())
    }

    #[test]
    fn test_passing_definition() {
        let result = run_toml(
            r#"
name = "a perfect game"
[given]
step = "a perfect game"
rolls = [10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10]
[[then]]
step = "the score should equal 300"
checks = ["score = 300", "frame.1 = 30", "error = none"]
"#,
        );
        assert!(result.passed());
        assert_eq!(result.step_count(), 3);
        assert_eq!(result.output(Phase::When).next(), Some("score: 300"));
    }

    #[test]
    fn test_failing_check_is_recorded() {
        let result = run_toml(
            r#"
name = "one spare"
[given]
step = "a game with one spare"
rolls = [4, 6, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
[[then]]
step = "the score should be seventeen"
checks = ["score = 17"]
[[then]]
step = "the score should be sixteen"
checks = ["score = 16"]
"#,
        );
        assert!(!result.passed());
        let failures = result.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.name, "the score should be seventeen");
    }

    #[test]
    fn test_error_outcome_checks() {
        let result = run_toml(
            r#"
name = "short game"
[given]
step = "a game of one frame"
rolls = [3, 4]
[[then]]
step = "scoring reports an incomplete game"
checks = ["error = incomplete_game"]
[[then]]
step = "score checks fail on an unscored game"
checks = ["score = 7"]
"#,
        );
        let errors: Vec<_> = result.errors(Phase::Then).collect();
        assert_eq!(errors[0], None);
        assert!(errors[1].unwrap().contains("game did not score"));
    }

    #[test]
    fn test_out_of_range_roll_outcome() {
        let outcome = play(&[3, 11]);
        assert!(evaluate_checks(&["error = out_of_range_roll".to_string()], &outcome).is_ok());
    }

    #[test]
    fn test_bad_check_syntax() {
        let outcome = play(&[0; 20]);
        assert!(evaluate_checks(&["score".to_string()], &outcome).is_err());
        assert!(evaluate_checks(&["pins = 3".to_string()], &outcome).is_err());
        assert!(evaluate_checks(&["frame.11 = 0".to_string()], &outcome).is_err());
        assert!(evaluate_checks(&["frame.x = 0".to_string()], &outcome).is_err());
    }

    #[test]
    fn test_load_failure() {
        let result = load_failure("broken", "Failed to parse broken.toml");
        assert!(!result.passed());
        assert!(result.is_finalized());
        assert_eq!(result.errors(Phase::Given).next(), Some(Some("Failed to parse broken.toml")));
    }

    #[test]
    fn test_bundled_scenarios_pass() {
        let base = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(crate::constants::SCENARIOS_DIR);
        let mut registry = ScenarioRegistry::new();
        let count = register_scenario_files(&mut registry, &base);
        assert!(count > 0);
        assert!(registry.contains("bowling/perfect_game"));

        let report = registry.run(&RunOptions::default());
        for scenario in &report.scenarios {
            assert!(scenario.passed(), "{} failed: {:?}", scenario.name(), scenario.failures());
        }
    }

    #[test]
    fn test_builtin_and_file_results_have_unique_names() {
        let base = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(crate::constants::SCENARIOS_DIR);
        let mut registry = ScenarioRegistry::new();
        crate::scoring::register_bowling_specs(&mut registry).unwrap();
        register_scenario_files(&mut registry, &base);

        let report = registry.run(&RunOptions::default());
        let names: std::collections::HashSet<&str> = report.scenarios.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), report.scenarios.len());
        assert_eq!(names.len(), registry.len());

        let mut db = crate::testing::ResultDatabase::open_in_memory().unwrap();
        db.insert_run(&report).unwrap();
        assert_eq!(db.scenario_history("a perfect game", 10).unwrap().len(), 1);
        assert_eq!(db.scenario_history("bowling/perfect_game", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_rolls_fail_given() {
        let result = run_toml(
            r#"
name = "no rolls"
[given]
step = "a game with no rolls"
rolls = []
[[then]]
step = "the score should be zero"
checks = ["score = 0"]
"#,
        );
        assert!(!result.passed());
        assert_eq!(result.step_count(), 1);
        assert!(result.errors(Phase::Given).next().flatten().unwrap().contains("roll count"));
    }
}
