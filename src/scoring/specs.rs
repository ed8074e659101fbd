//! Built-in bowling scenarios
//!
//! Each scenario rolls a game, scores it and checks the total (or the
//! scoring error for games that cannot be scored).

use super::{ScoreError, roll_game};
use crate::testing::{RegistryError, Scenario, ScenarioRegistry, ScenarioResult, StepError, expect_eq, expect_ne};

/// Expected outcome of scoring a game
#[derive(Debug, Clone, Copy)]
enum Expect {
    Score(u32),
    Error(&'static str),
}

struct BowlingSpec {
    given: &'static str,
    rolls: Vec<u32>,
    then: &'static str,
    expect: Expect,
}

fn with_zeros(head: &[u32], zeros: usize) -> Vec<u32> {
    let mut rolls = head.to_vec();
    rolls.resize(head.len() + zeros, 0);
    rolls
}

fn bowling_specs() -> Vec<BowlingSpec> {
    vec![
        BowlingSpec {
            given: "a game with all gutter balls",
            rolls: vec![0; 20],
            then: "the score should be zero",
            expect: Expect::Score(0),
        },
        BowlingSpec {
            given: "a game with all ones",
            rolls: vec![1; 20],
            then: "the score should be twenty",
            expect: Expect::Score(20),
        },
        BowlingSpec {
            given: "a game with one spare",
            rolls: with_zeros(&[4, 6, 3], 17),
            then: "the score should include the next roll as bonus",
            expect: Expect::Score(4 + 6 + 3 + 3),
        },
        BowlingSpec {
            given: "a game with one strike",
            rolls: with_zeros(&[10, 3, 4], 16),
            then: "the score should include the next frame as a bonus",
            expect: Expect::Score(10 + 3 + 4 + 3 + 4),
        },
        BowlingSpec {
            given: "a perfect game",
            rolls: vec![10; 12],
            then: "the score should equal 300",
            expect: Expect::Score(300),
        },
        BowlingSpec {
            given: "a game ending in a spare",
            rolls: [vec![0; 18], vec![7, 3, 5]].concat(),
            then: "the last frame should take one bonus roll",
            expect: Expect::Score(15),
        },
        BowlingSpec {
            given: "a game ending in a strike",
            rolls: [vec![0; 18], vec![10, 4, 2]].concat(),
            then: "the last frame should take two bonus rolls",
            expect: Expect::Score(16),
        },
        BowlingSpec {
            given: "a game missing its bonus rolls",
            rolls: vec![10; 10],
            then: "scoring should report an incomplete game",
            expect: Expect::Error("incomplete_game"),
        },
        BowlingSpec {
            given: "a game with an eleven pin roll",
            rolls: with_zeros(&[11], 19),
            then: "the roll should be rejected",
            expect: Expect::Error("out_of_range_roll"),
        },
    ]
}

fn run_spec(spec: &BowlingSpec) -> ScenarioResult {
    Scenario::run(spec.given, |ctx| {
        // Rolling happens in the when step so rejected rolls become the outcome
        let Some(rolls) = ctx.given(spec.given, || {
            expect_ne("roll count", spec.rolls.len(), 0)?;
            Ok(spec.rolls.clone())
        }) else {
            return;
        };

        let Some(score) = ctx.when("the score is calculated", || Ok(score_rolls(&rolls))) else {
            return;
        };
        if let Ok(total) = &score {
            ctx.output(format!("score: {}", total));
        }

        ctx.then(spec.then, || match (spec.expect, &score) {
            (Expect::Score(expected), Ok(total)) => Ok(expect_eq("score", *total, expected)?),
            (Expect::Score(_), Err(e)) => Err(StepError::failed(e)),
            (Expect::Error(kind), Err(e)) => Ok(expect_eq("error", e.kind(), kind)?),
            (Expect::Error(kind), Ok(total)) => Err(StepError::failed(format!(
                "expected {} but the game scored {}",
                kind, total
            ))),
        });
    })
}

fn score_rolls(rolls: &[u32]) -> Result<u32, ScoreError> {
    roll_game(rolls)?.score()
}

/// Register the built-in bowling scenarios under their given-step names
pub fn register_bowling_specs(registry: &mut ScenarioRegistry) -> Result<(), RegistryError> {
    for spec in bowling_specs() {
        let name = spec.given;
        registry.register(name, move || run_spec(&spec))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Phase, RunOptions};

    #[test]
    fn test_builtin_specs_pass() {
        let mut registry = ScenarioRegistry::new();
        register_bowling_specs(&mut registry).unwrap();
        assert_eq!(registry.len(), bowling_specs().len());

        let report = registry.run(&RunOptions::default());
        for scenario in &report.scenarios {
            assert!(scenario.passed(), "{} failed: {:?}", scenario.name(), scenario.failures());
            assert_eq!(scenario.step_count(), 3);
        }
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut registry = ScenarioRegistry::new();
        register_bowling_specs(&mut registry).unwrap();
        assert!(matches!(
            register_bowling_specs(&mut registry),
            Err(RegistryError::DuplicateScenario(_))
        ));
    }

    #[test]
    fn test_wrong_expectation_fails() {
        let spec = BowlingSpec {
            given: "a game with one spare",
            rolls: with_zeros(&[4, 6, 3], 17),
            then: "the score should be seventeen",
            expect: Expect::Score(17),
        };
        let result = run_spec(&spec);
        assert!(!result.passed());
        let error = result.errors(Phase::Then).next().flatten().unwrap();
        assert!(error.contains("Actual: 16"));
    }

    #[test]
    fn test_unexpected_error_fails() {
        let spec = BowlingSpec {
            given: "a short game",
            rolls: vec![1, 2],
            then: "the score should be three",
            expect: Expect::Score(3),
        };
        let result = run_spec(&spec);
        assert!(!result.passed());
        assert_eq!(result.output(Phase::When).next(), Some(""));
    }
}
