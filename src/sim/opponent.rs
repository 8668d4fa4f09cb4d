//! Scripted opponent
//!
//! A deliberately simple policy: spend the roll on random prism rotations and
//! single-step nudges, then fire from a random open baseline column. It plays
//! through the same command surface a human host would, so the validator has
//! the final word on every action.

use glam::IVec2;
use rand::Rng;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::beam::Direction;
use super::error::RuleError;
use super::piece::{Piece, Side};
use super::rules;
use super::state::{MatchState, Phase};
use super::turn::{Command, Outcome, Resolution};
use crate::consts::{OPPONENT_ACTION_ATTEMPTS, OPPONENT_ROTATE_CHANCE};
use crate::in_bounds;

/// What the opponent did with its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub roll: u8,
    /// Moves and rotations that were applied
    pub actions: u32,
    /// Attempts consumed, including refused ones
    pub attempts: u32,
    /// Cell the beam was fired from
    pub fired_from: IVec2,
    pub resolution: Resolution,
}

/// Random policy with its own seeded source, independent of the match RNG
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    side: Side,
    rng: Pcg32,
}

impl ScriptedOpponent {
    pub fn new(side: Side, seed: u64) -> Self {
        Self {
            side,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Play one whole turn: roll, act, shoot
    pub fn take_turn(&mut self, state: &mut MatchState) -> Result<TurnReport, RuleError> {
        let side = self.side;
        let Outcome::Rolled(roll) = state.apply(side, Command::Roll)? else {
            return Err(RuleError::WrongPhase {
                expected: Phase::Roll,
                actual: state.phase(),
            });
        };

        let mut actions = 0;
        let mut attempts = 0;
        while state.phase() == Phase::Act && attempts < OPPONENT_ACTION_ATTEMPTS {
            attempts += 1;
            if self.try_action(state)? {
                actions += 1;
            }
        }

        if state.phase() == Phase::Act {
            state.apply(side, Command::EndActions)?;
        }

        let open = rules::open_baseline_columns(state.board(), side);
        let fired_from = match open.choose(&mut self.rng) {
            Some(&column) => state.reposition_emitter(side, column)?,
            None => state.board().emitter(side),
        };

        let resolution = state.fire(side)?;
        log::debug!(
            "{side} turn: roll {roll}, {actions} actions in {attempts} attempts, fired from {fired_from}"
        );
        Ok(TurnReport {
            roll,
            actions,
            attempts,
            fired_from,
            resolution,
        })
    }

    /// One random action; true if it was applied
    fn try_action(&mut self, state: &mut MatchState) -> Result<bool, RuleError> {
        let side = self.side;
        let candidates = rules::selectable_cells(state.board());
        let Some(&pos) = candidates.choose(&mut self.rng) else {
            return Ok(false);
        };
        let piece = *state.board().get(pos)?;

        if let Piece::Prism { orientation } = piece {
            if self.rng.random_bool(OPPONENT_ROTATE_CHANCE) {
                state.apply(side, Command::SelectPiece(pos))?;
                state.apply(side, Command::Rotate(orientation.rotated_cw()))?;
                return Ok(true);
            }
        }

        let Some(direction) = Direction::CARDINALS.choose(&mut self.rng) else {
            return Ok(false);
        };
        let to = pos + direction.delta();
        if !in_bounds(to) {
            return Ok(false);
        }
        state.apply(side, Command::SelectPiece(pos))?;
        let outcome = state.apply(side, Command::MoveTo(to))?;
        Ok(matches!(outcome, Outcome::Moved { .. }))
    }
}
