//! Scoring module - bowling roll history and ten-frame scoring
//!
//! A `BowlingGame` records rolls as they happen and scores them on demand.
//! Scoring walks a roll cursor across ten frames: a strike consumes one roll
//! and borrows the next two as bonus, a spare consumes two rolls and borrows
//! one, an open frame consumes two. Bonus rolls after the tenth frame must be
//! rolled explicitly; a game that stops short fails with `IncompleteGame`.
//! Two bonus balls after a final strike obey the same ten-pin limit as a
//! frame unless the first of them is a strike. Rolls past the last counted
//! bonus ball are not scored.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::constants::{ALL_PINS, FRAMES_PER_GAME, SPARE_BONUS_ROLLS, STRIKE_BONUS_ROLLS};

pub mod specs;

pub use specs::register_bowling_specs;

/// Errors raised while recording or scoring a game
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("roll of {pins} pins is outside 0-10")]
    OutOfRangeRoll { pins: u32 },
    #[error("frame {frame} needs more rolls than the {rolls} recorded")]
    IncompleteGame { frame: usize, rolls: usize },
    #[error("frame {frame} knocks down {pins} pins with two rolls")]
    FrameOverflow { frame: usize, pins: u32 },
}

impl ScoreError {
    /// Stable identifier used by scenario checks (`error = incomplete_game`)
    pub fn kind(&self) -> &'static str {
        match self {
            ScoreError::OutOfRangeRoll { .. } => "out_of_range_roll",
            ScoreError::IncompleteGame { .. } => "incomplete_game",
            ScoreError::FrameOverflow { .. } => "frame_overflow",
        }
    }
}

/// How a frame was completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Strike,
    Spare,
    Open,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FrameKind::Strike => "strike",
            FrameKind::Spare => "spare",
            FrameKind::Open => "open",
        };
        f.pad(label)
    }
}

/// Score of one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameScore {
    /// Frame number (1-based)
    pub number: usize,
    /// Rolls thrown in this frame (frame 10 includes its bonus rolls)
    pub rolls: Vec<u32>,
    pub kind: FrameKind,
    /// Pins plus bonus credited to this frame
    pub frame_total: u32,
    /// Game total after this frame
    pub running_total: u32,
}

/// Frame-by-frame breakdown of a scored game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scorecard {
    pub frames: Vec<FrameScore>,
    pub total: u32,
}

impl Scorecard {
    /// Running total after the given frame (1-based)
    pub fn total_after(&self, frame: usize) -> Option<u32> {
        frame
            .checked_sub(1)
            .and_then(|idx| self.frames.get(idx))
            .map(|f| f.running_total)
    }
}

/// Roll history for one game
#[derive(Debug, Clone, Default)]
pub struct BowlingGame {
    rolls: Vec<u32>,
}

impl BowlingGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one roll. Out-of-range rolls are rejected and not recorded.
    pub fn roll(&mut self, pins: u32) -> Result<(), ScoreError> {
        if pins > ALL_PINS {
            return Err(ScoreError::OutOfRangeRoll { pins });
        }
        self.rolls.push(pins);
        Ok(())
    }

    pub fn rolls(&self) -> &[u32] {
        &self.rolls
    }

    /// Total score across ten frames
    pub fn score(&self) -> Result<u32, ScoreError> {
        self.scorecard().map(|card| card.total)
    }

    /// Score every frame, including running totals
    pub fn scorecard(&self) -> Result<Scorecard, ScoreError> {
        let mut frames = Vec::with_capacity(FRAMES_PER_GAME);
        let mut total = 0;
        let mut cursor = 0;

        for number in 1..=FRAMES_PER_GAME {
            let first = self.pins_at(cursor, number)?;

            // (kind, rolls consumed by the frame, rolls counted toward its score)
            let (kind, consumed, counted) = if first == ALL_PINS {
                (FrameKind::Strike, 1, 1 + STRIKE_BONUS_ROLLS)
            } else {
                let pins = first + self.pins_at(cursor + 1, number)?;
                if pins > ALL_PINS {
                    return Err(ScoreError::FrameOverflow { frame: number, pins });
                }
                if pins == ALL_PINS {
                    (FrameKind::Spare, 2, 2 + SPARE_BONUS_ROLLS)
                } else {
                    (FrameKind::Open, 2, 2)
                }
            };

            let counted_rolls = (cursor..cursor + counted)
                .map(|idx| self.pins_at(idx, number))
                .collect::<Result<Vec<_>, _>>()?;
            if number == FRAMES_PER_GAME && kind == FrameKind::Strike {
                check_bonus_pair(counted_rolls[1], counted_rolls[2])?;
            }
            let frame_total: u32 = counted_rolls.iter().sum();
            total += frame_total;

            let rolls = if number == FRAMES_PER_GAME {
                counted_rolls
            } else {
                counted_rolls[..consumed].to_vec()
            };

            frames.push(FrameScore {
                number,
                rolls,
                kind,
                frame_total,
                running_total: total,
            });
            cursor += consumed;
        }

        Ok(Scorecard { frames, total })
    }

    fn pins_at(&self, index: usize, frame: usize) -> Result<u32, ScoreError> {
        self.rolls
            .get(index)
            .copied()
            .ok_or(ScoreError::IncompleteGame {
                frame,
                rolls: self.rolls.len(),
            })
    }
}

// After a tenth-frame strike the two bonus balls share a rack unless the
// first of them is also a strike
fn check_bonus_pair(first: u32, second: u32) -> Result<(), ScoreError> {
    let pins = first + second;
    if first < ALL_PINS && pins > ALL_PINS {
        return Err(ScoreError::FrameOverflow {
            frame: FRAMES_PER_GAME,
            pins,
        });
    }
    Ok(())
}

/// Build a game from a roll sequence, stopping at the first invalid roll
pub fn roll_game(rolls: &[u32]) -> Result<BowlingGame, ScoreError> {
    let mut game = BowlingGame::new();
    for &pins in rolls {
        game.roll(pins)?;
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rolls_then_zeros(head: &[u32], zeros: usize) -> Vec<u32> {
        let mut rolls = head.to_vec();
        rolls.extend(std::iter::repeat_n(0, zeros));
        rolls
    }

    #[test]
    fn test_gutter_game() {
        let game = roll_game(&[0; 20]).unwrap();
        assert_eq!(game.score().unwrap(), 0);
    }

    #[test]
    fn test_all_ones() {
        let game = roll_game(&[1; 20]).unwrap();
        assert_eq!(game.score().unwrap(), 20);
    }

    #[test]
    fn test_one_spare() {
        let game = roll_game(&rolls_then_zeros(&[4, 6, 3], 17)).unwrap();
        assert_eq!(game.score().unwrap(), 4 + 6 + 3 + 3);
    }

    #[test]
    fn test_one_strike() {
        let game = roll_game(&rolls_then_zeros(&[10, 3, 4], 16)).unwrap();
        assert_eq!(game.score().unwrap(), 24);
    }

    #[test]
    fn test_perfect_game() {
        let game = roll_game(&[10; 12]).unwrap();
        let card = game.scorecard().unwrap();
        assert_eq!(card.total, 300);
        assert_eq!(card.frames.len(), 10);
        assert!(card.frames.iter().all(|f| f.kind == FrameKind::Strike));
        assert_eq!(card.frames[9].rolls, vec![10, 10, 10]);
    }

    #[test]
    fn test_score_is_idempotent() {
        let game = roll_game(&rolls_then_zeros(&[10, 3, 4], 16)).unwrap();
        let first = game.score().unwrap();
        assert_eq!(game.score().unwrap(), first);
    }

    #[test]
    fn test_spare_in_last_frame_takes_one_bonus() {
        // Nine open frames of zeros, then 7/3 with bonus 5. Extra roll ignored.
        let mut rolls = vec![0; 18];
        rolls.extend([7, 3, 5, 9]);
        let card = roll_game(&rolls).unwrap().scorecard().unwrap();
        assert_eq!(card.total, 15);
        assert_eq!(card.frames[9].kind, FrameKind::Spare);
        assert_eq!(card.frames[9].rolls, vec![7, 3, 5]);
    }

    #[test]
    fn test_strike_in_last_frame_takes_two_bonus() {
        let mut rolls = vec![0; 18];
        rolls.extend([10, 4, 2]);
        let card = roll_game(&rolls).unwrap().scorecard().unwrap();
        assert_eq!(card.total, 16);
        assert_eq!(card.frames[9].frame_total, 16);
    }

    #[test]
    fn test_missing_bonus_is_incomplete() {
        let mut rolls = vec![0; 18];
        rolls.extend([10, 4]);
        let game = roll_game(&rolls).unwrap();
        assert_eq!(
            game.score(),
            Err(ScoreError::IncompleteGame { frame: 10, rolls: 20 })
        );
    }

    #[test]
    fn test_short_game_is_incomplete() {
        let game = roll_game(&[3, 4]).unwrap();
        let err = game.score().unwrap_err();
        assert_eq!(err, ScoreError::IncompleteGame { frame: 2, rolls: 2 });
        assert_eq!(err.kind(), "incomplete_game");
    }

    #[test]
    fn test_out_of_range_roll_not_recorded() {
        let mut game = BowlingGame::new();
        assert_eq!(game.roll(11), Err(ScoreError::OutOfRangeRoll { pins: 11 }));
        assert!(game.rolls().is_empty());
        assert!(roll_game(&[5, 12]).is_err());
    }

    #[test]
    fn test_frame_overflow() {
        let game = roll_game(&rolls_then_zeros(&[7, 5], 18)).unwrap();
        assert_eq!(
            game.score(),
            Err(ScoreError::FrameOverflow { frame: 1, pins: 12 })
        );
    }

    #[test]
    fn test_tenth_frame_bonus_pair_overflow() {
        let mut rolls = vec![0; 18];
        rolls.extend([10, 5, 7]);
        assert_eq!(
            roll_game(&rolls).unwrap().score(),
            Err(ScoreError::FrameOverflow { frame: 10, pins: 12 })
        );

        // A strike on the first bonus ball racks the pins again
        let mut rolls = vec![0; 18];
        rolls.extend([10, 10, 7]);
        assert_eq!(roll_game(&rolls).unwrap().score(), Ok(27));
    }

    #[test]
    fn test_running_totals() {
        let card = roll_game(&rolls_then_zeros(&[10, 3, 4], 16))
            .unwrap()
            .scorecard()
            .unwrap();
        assert_eq!(card.total_after(1), Some(17));
        assert_eq!(card.total_after(2), Some(24));
        assert_eq!(card.total_after(10), Some(24));
        assert_eq!(card.total_after(0), None);
        assert_eq!(card.total_after(11), None);
    }
}
