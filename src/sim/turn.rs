//! Turn state machine
//!
//! Roll → Act → Shoot → Resolve, then the other side's Roll. Every command
//! is gated on the active side and the current phase; a rejected command
//! leaves the match untouched.

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::beam::{BeamTrace, trace_beam};
use super::board::BlockDamage;
use super::error::{MoveViolation, RuleError};
use super::piece::{Orientation, Piece, Side};
use super::rules;
use super::score::calculate_score;
use super::state::{GameEvent, MatchState, Phase, Selection};
use crate::consts::{MAX_ROLL, MIN_ROLL};

/// Action commands accepted by a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Draw the action budget
    Roll,
    /// Pick a prism or block to act on
    SelectPiece(IVec2),
    /// Move the selected piece
    MoveTo(IVec2),
    /// Rotate the selected prism
    Rotate(Orientation),
    /// Stop acting early, forfeiting leftover AP
    EndActions,
    /// Slide the emitter along its baseline before firing
    RepositionEmitter(i32),
    Fire,
    Surrender,
}

/// What a beam shot did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Opposing generator destroyed; the match is over
    Victory { winner: Side, score: u64 },
    BlockHit(BlockDamage),
    /// Left the board, absorbed, or stopped somewhere harmless
    NoEffect,
}

/// Successful command result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Rolled(u8),
    Selected(Selection),
    Moved { from: IVec2, to: IVec2, cost: u8 },
    /// Destination was illegal; the piece was dropped and no AP spent
    Deselected(MoveViolation),
    Rotated { pos: IVec2, orientation: Orientation },
    PhaseEnded,
    EmitterMoved(IVec2),
    Fired(Resolution),
    Surrendered,
}

impl MatchState {
    /// Dispatch a command issued by `side`
    pub fn apply(&mut self, side: Side, command: Command) -> Result<Outcome, RuleError> {
        match command {
            Command::Roll => self.roll(side).map(Outcome::Rolled),
            Command::SelectPiece(pos) => self.select_piece(side, pos).map(Outcome::Selected),
            Command::MoveTo(pos) => self.move_to(side, pos),
            Command::Rotate(orientation) => self.rotate(side, orientation),
            Command::EndActions => self.end_actions(side).map(|()| Outcome::PhaseEnded),
            Command::RepositionEmitter(column) => self
                .reposition_emitter(side, column)
                .map(Outcome::EmitterMoved),
            Command::Fire => self.fire(side).map(Outcome::Fired),
            Command::Surrender => self.surrender(side).map(|()| Outcome::Surrendered),
        }
    }

    fn require(&self, side: Side, expected: Phase) -> Result<(), RuleError> {
        let actual = self.turn.phase;
        if actual.is_over() {
            return Err(RuleError::WrongPhase { expected, actual });
        }
        if self.turn.active != side {
            return Err(RuleError::NotYourTurn(side));
        }
        if actual != expected {
            return Err(RuleError::WrongPhase { expected, actual });
        }
        Ok(())
    }

    /// Draw an action budget in `[1, 3]`
    pub fn roll(&mut self, side: Side) -> Result<u8, RuleError> {
        self.require(side, Phase::Roll)?;
        let value = self.rng.random_range(MIN_ROLL..=MAX_ROLL);
        self.turn.action_points = value;
        self.turn.last_roll = Some(value);
        self.turn.phase = Phase::Act;
        log::debug!("{side} rolled {value} AP");
        self.emit(GameEvent::Rolled { side, value });
        Ok(value)
    }

    /// Select a piece to act on, replacing any previous selection
    pub fn select_piece(&mut self, side: Side, pos: IVec2) -> Result<Selection, RuleError> {
        self.require(side, Phase::Act)?;
        let piece = self.board.get(pos)?;
        let mode = rules::selection_mode(piece).ok_or(MoveViolation::NotSelectable)?;
        let selection = Selection { pos, mode };
        self.selection = Some(selection);
        Ok(selection)
    }

    /// Move the selected piece
    ///
    /// An illegal destination drops the selection instead of failing.
    pub fn move_to(&mut self, side: Side, to: IVec2) -> Result<Outcome, RuleError> {
        self.require(side, Phase::Act)?;
        let selection = self.selection.ok_or(MoveViolation::NothingSelected)?;
        let from = selection.pos;

        let cost = match rules::validate_move(&self.board, from, to, self.turn.action_points) {
            Ok(cost) => cost,
            Err(RuleError::IllegalMove(violation)) => {
                self.selection = None;
                log::debug!("{side} move {from} -> {to} refused: {violation}");
                return Ok(Outcome::Deselected(violation));
            }
            Err(err) => return Err(err),
        };

        self.board.move_piece(from, to)?;
        self.selection = None;
        self.spend(cost);
        log::debug!("{side} moved {from} -> {to} for {cost} AP");
        self.emit(GameEvent::PieceMoved {
            side,
            from,
            to,
            cost,
        });
        Ok(Outcome::Moved { from, to, cost })
    }

    /// Rotate the selected prism to `orientation`
    pub fn rotate(&mut self, side: Side, orientation: Orientation) -> Result<Outcome, RuleError> {
        self.require(side, Phase::Act)?;
        let selection = self.selection.ok_or(MoveViolation::NothingSelected)?;
        let pos = selection.pos;
        let cost =
            rules::validate_rotation(&self.board, pos, orientation, self.turn.action_points)?;

        self.board.set_orientation(pos, orientation)?;
        self.selection = None;
        self.spend(cost);
        log::debug!("{side} rotated {pos} to {}°", orientation.degrees());
        self.emit(GameEvent::PieceRotated {
            side,
            pos,
            orientation,
        });
        Ok(Outcome::Rotated { pos, orientation })
    }

    /// Leave the act phase with AP remaining
    pub fn end_actions(&mut self, side: Side) -> Result<(), RuleError> {
        self.require(side, Phase::Act)?;
        if self.turn.action_points > 0 {
            log::debug!("{side} forfeits {} AP", self.turn.action_points);
        }
        self.enter_shoot();
        Ok(())
    }

    /// Slide the active emitter to `column` on its baseline
    pub fn reposition_emitter(&mut self, side: Side, column: i32) -> Result<IVec2, RuleError> {
        self.require(side, Phase::Shoot)?;
        let from = self.board.emitter(side);
        let to = rules::validate_reposition(&self.board, side, column)?;
        if to != from {
            self.board.move_piece(from, to)?;
            self.emit(GameEvent::EmitterRepositioned { side, to });
        }
        Ok(to)
    }

    /// Fire the active beam and resolve it
    pub fn fire(&mut self, side: Side) -> Result<Resolution, RuleError> {
        self.require(side, Phase::Shoot)?;
        let trace = trace_beam(&self.board, side);
        log::debug!(
            "{side} fired: {} cells, {} deflections, {:?}",
            trace.path.len(),
            trace.deflections,
            trace.termination
        );
        self.emit(GameEvent::BeamFired {
            side,
            trace: trace.clone(),
        });

        self.turn.phase = Phase::Resolve;
        let resolution = self.resolve(side, &trace);
        self.last_trace = Some(trace);

        if !self.is_over() {
            self.turn.turns += 1;
            self.turn.active = side.opponent();
            self.turn.phase = Phase::Roll;
            self.turn.action_points = 0;
            self.emit(GameEvent::TurnPassed {
                to: self.turn.active,
                turn: self.turn.turns,
            });
        }
        Ok(resolution)
    }

    /// Concede the match; only the Player side may surrender
    pub fn surrender(&mut self, side: Side) -> Result<(), RuleError> {
        let actual = self.turn.phase;
        if actual.is_over() {
            return Err(RuleError::WrongPhase {
                expected: Phase::Act,
                actual,
            });
        }
        if side != Side::Player {
            return Err(RuleError::NotYourTurn(side));
        }
        self.selection = None;
        self.turn.action_points = 0;
        self.emit(GameEvent::Surrendered { side });
        self.finish(side.opponent(), 0);
        log::info!("{side} surrendered");
        Ok(())
    }

    fn resolve(&mut self, side: Side, trace: &BeamTrace) -> Resolution {
        let Some(pos) = trace.terminal() else {
            return Resolution::NoEffect;
        };
        match self.board.piece_at(pos).copied() {
            Some(Piece::Generator { side: owner }) if owner != side => {
                let score = match side {
                    Side::Player => calculate_score(trace.deflections),
                    Side::Opponent => 0,
                };
                self.finish(side, score);
                Resolution::Victory {
                    winner: side,
                    score,
                }
            }
            Some(Piece::Block { .. }) => match self.board.damage_block(pos) {
                Some(damage) => {
                    self.emit(GameEvent::from_damage(pos, damage));
                    Resolution::BlockHit(damage)
                }
                None => Resolution::NoEffect,
            },
            _ => Resolution::NoEffect,
        }
    }

    fn finish(&mut self, winner: Side, score: u64) {
        self.score = score;
        self.turn.phase = Phase::GameOver { winner };
        log::info!(
            "Match over after {} turns: {winner} wins, score {score}",
            self.turn.turns
        );
        self.emit(GameEvent::MatchEnded { winner, score });
    }

    fn spend(&mut self, cost: u8) {
        self.turn.action_points = self.turn.action_points.saturating_sub(cost);
        if self.turn.action_points == 0 {
            self.enter_shoot();
        }
    }

    fn enter_shoot(&mut self) {
        self.selection = None;
        self.turn.action_points = 0;
        self.turn.phase = Phase::Shoot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MatchConfig;
    use crate::sim::board::{Board, BoardBuilder};
    use crate::sim::piece::PieceKind;

    fn match_with(pieces: &[(IVec2, Piece)]) -> MatchState {
        let mut builder = BoardBuilder::with_standard_pieces();
        for &(pos, piece) in pieces {
            builder = builder.place(pos, piece).unwrap();
        }
        let board: Board = builder.build().unwrap();
        MatchState::from_board(MatchConfig::default(), board, 99)
    }

    /// Roll until the budget is at least `min` (both sides roll and pass)
    fn roll_at_least(state: &mut MatchState, min: u8) {
        loop {
            let side = state.turn().active;
            let value = state.roll(side).unwrap();
            if side == Side::Player && value >= min {
                return;
            }
            state.end_actions(side).unwrap();
            state.fire(side).unwrap();
        }
    }

    #[test]
    fn test_roll_range_and_phase() {
        let mut state = match_with(&[]);
        let value = state.roll(Side::Player).unwrap();
        assert!((1..=3).contains(&value));
        assert_eq!(state.phase(), Phase::Act);
        assert_eq!(state.turn().action_points, value);
        assert_eq!(
            state.roll(Side::Player),
            Err(RuleError::WrongPhase {
                expected: Phase::Roll,
                actual: Phase::Act
            })
        );
    }

    #[test]
    fn test_not_your_turn() {
        let mut state = match_with(&[]);
        assert_eq!(state.roll(Side::Opponent), Err(RuleError::NotYourTurn(Side::Opponent)));
        assert_eq!(state.fire(Side::Opponent), Err(RuleError::NotYourTurn(Side::Opponent)));
    }

    #[test]
    fn test_fire_requires_shoot_phase() {
        let mut state = match_with(&[]);
        assert!(matches!(
            state.fire(Side::Player),
            Err(RuleError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_select_rules() {
        let mut state = match_with(&[(IVec2::new(3, 4), Piece::block())]);
        state.roll(Side::Player).unwrap();
        assert_eq!(
            state.select_piece(Side::Player, IVec2::new(7, 7)),
            Err(RuleError::IllegalMove(MoveViolation::NotSelectable))
        );
        assert_eq!(
            state.select_piece(Side::Player, IVec2::new(-1, 7)),
            Err(RuleError::OutOfBounds(IVec2::new(-1, 7)))
        );
        let selection = state.select_piece(Side::Player, IVec2::new(3, 4)).unwrap();
        assert_eq!(selection.mode, rules::SelectionMode::Move);
        assert_eq!(state.selection(), Some(selection));
    }

    #[test]
    fn test_move_spends_ap() {
        let mut state = match_with(&[(IVec2::new(3, 4), Piece::block())]);
        roll_at_least(&mut state, 2);
        let budget = state.turn().action_points;
        state.select_piece(Side::Player, IVec2::new(3, 4)).unwrap();
        let outcome = state.move_to(Side::Player, IVec2::new(4, 4)).unwrap();
        assert_eq!(
            outcome,
            Outcome::Moved {
                from: IVec2::new(3, 4),
                to: IVec2::new(4, 4),
                cost: 1
            }
        );
        assert_eq!(state.turn().action_points, budget - 1);
        assert_eq!(state.phase(), Phase::Act);
        assert!(state.selection().is_none());
        assert_eq!(state.board().get(IVec2::new(4, 4)).unwrap().kind(), PieceKind::Block);
    }

    #[test]
    fn test_illegal_destination_deselects() {
        let mut state = match_with(&[(IVec2::new(3, 4), Piece::block())]);
        state.roll(Side::Player).unwrap();
        let budget = state.turn().action_points;
        state.select_piece(Side::Player, IVec2::new(3, 4)).unwrap();
        let outcome = state.move_to(Side::Player, IVec2::new(4, 5)).unwrap();
        assert_eq!(outcome, Outcome::Deselected(MoveViolation::NotCollinear));
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(serde_json::from_str::<Outcome>(&json).unwrap(), outcome);
        assert!(state.selection().is_none());
        assert_eq!(state.turn().action_points, budget);
        assert_eq!(state.phase(), Phase::Act);

        assert_eq!(
            state.move_to(Side::Player, IVec2::new(3, 3)),
            Err(RuleError::IllegalMove(MoveViolation::NothingSelected))
        );
    }

    #[test]
    fn test_rotation_costs_one() {
        let mut state = match_with(&[(IVec2::new(2, 2), Piece::prism(Orientation::Deg0))]);
        state.roll(Side::Player).unwrap();
        let budget = state.turn().action_points;
        state.select_piece(Side::Player, IVec2::new(2, 2)).unwrap();
        state.rotate(Side::Player, Orientation::Deg180).unwrap();
        assert_eq!(
            state.board().get(IVec2::new(2, 2)).unwrap().orientation(),
            Some(Orientation::Deg180)
        );
        if budget == 1 {
            assert_eq!(state.phase(), Phase::Shoot);
        } else {
            assert_eq!(state.turn().action_points, budget - 1);
        }
    }

    #[test]
    fn test_rotate_block_rejected() {
        let mut state = match_with(&[(IVec2::new(3, 4), Piece::block())]);
        state.roll(Side::Player).unwrap();
        state.select_piece(Side::Player, IVec2::new(3, 4)).unwrap();
        assert_eq!(
            state.rotate(Side::Player, Orientation::Deg90),
            Err(RuleError::NotRotatable(IVec2::new(3, 4)))
        );
    }

    #[test]
    fn test_end_actions_forfeits() {
        let mut state = match_with(&[]);
        state.roll(Side::Player).unwrap();
        state.end_actions(Side::Player).unwrap();
        assert_eq!(state.phase(), Phase::Shoot);
        assert_eq!(state.turn().action_points, 0);
    }

    #[test]
    fn test_reposition_and_fire_passes_turn() {
        let mut state = match_with(&[]);
        state.roll(Side::Player).unwrap();
        state.end_actions(Side::Player).unwrap();
        assert_eq!(
            state.reposition_emitter(Side::Player, 4),
            Err(RuleError::IllegalMove(MoveViolation::Occupied))
        );
        assert_eq!(state.reposition_emitter(Side::Player, 1), Ok(IVec2::new(1, 7)));
        assert_eq!(state.fire(Side::Player), Ok(Resolution::NoEffect));
        assert_eq!(state.phase(), Phase::Roll);
        assert_eq!(state.turn().active, Side::Opponent);
        assert_eq!(state.turn().turns, 1);
        assert_eq!(state.last_trace().unwrap().origin(), Some(IVec2::new(1, 7)));
    }

    #[test]
    fn test_direct_hit_wins() {
        let mut state = match_with(&[]);
        state.roll(Side::Player).unwrap();
        state.end_actions(Side::Player).unwrap();
        state.reposition_emitter(Side::Player, 3).unwrap();
        let resolution = state.fire(Side::Player).unwrap();
        assert_eq!(
            resolution,
            Resolution::Victory {
                winner: Side::Player,
                score: 50
            }
        );
        assert_eq!(state.winner(), Some(Side::Player));
        assert_eq!(state.score(), 50);
        assert_eq!(state.turn().turns, 0);
        assert!(matches!(
            state.roll(Side::Opponent),
            Err(RuleError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_opponent_win_scores_zero() {
        let mut state = match_with(&[]);
        state.roll(Side::Player).unwrap();
        state.end_actions(Side::Player).unwrap();
        state.fire(Side::Player).unwrap();

        state.roll(Side::Opponent).unwrap();
        state.end_actions(Side::Opponent).unwrap();
        state.reposition_emitter(Side::Opponent, 4).unwrap();
        let resolution = state.fire(Side::Opponent).unwrap();
        assert_eq!(
            resolution,
            Resolution::Victory {
                winner: Side::Opponent,
                score: 0
            }
        );
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_block_cracks_then_breaks() {
        let mut state = match_with(&[(IVec2::new(7, 3), Piece::block())]);
        let pos = IVec2::new(7, 3);
        let mut hits = Vec::new();
        while hits.len() < 2 {
            let side = state.turn().active;
            state.roll(side).unwrap();
            state.end_actions(side).unwrap();
            let resolution = state.fire(side).unwrap();
            if side == Side::Player {
                hits.push(resolution);
            }
        }
        assert_eq!(hits[0], Resolution::BlockHit(BlockDamage::Cracked { integrity: 1 }));
        assert_eq!(hits[1], Resolution::BlockHit(BlockDamage::Destroyed));
        assert!(state.board().is_empty(pos));

        // Next player shot passes straight through the old block cell
        state.roll(Side::Opponent).unwrap();
        state.end_actions(Side::Opponent).unwrap();
        state.fire(Side::Opponent).unwrap();
        state.roll(Side::Player).unwrap();
        state.end_actions(Side::Player).unwrap();
        assert_eq!(state.fire(Side::Player), Ok(Resolution::NoEffect));
        assert!(state.last_trace().unwrap().path.contains(&pos));
        assert!(state.last_trace().unwrap().left_board());
    }

    #[test]
    fn test_surrender_during_act() {
        let mut state = match_with(&[]);
        state.roll(Side::Player).unwrap();
        state.surrender(Side::Player).unwrap();
        assert_eq!(state.winner(), Some(Side::Opponent));
        assert_eq!(state.turn().action_points, 0);
        assert_eq!(state.score(), 0);
        assert!(matches!(
            state.surrender(Side::Player),
            Err(RuleError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_surrender_on_opponent_turn() {
        let mut state = match_with(&[]);
        state.roll(Side::Player).unwrap();
        state.end_actions(Side::Player).unwrap();
        state.fire(Side::Player).unwrap();
        assert_eq!(state.surrender(Side::Opponent), Err(RuleError::NotYourTurn(Side::Opponent)));
        assert_eq!(state.apply(Side::Player, Command::Surrender), Ok(Outcome::Surrendered));
        assert_eq!(state.winner(), Some(Side::Opponent));
    }

    #[test]
    fn test_events_queued() {
        let mut state = match_with(&[]);
        state.apply(Side::Player, Command::Roll).unwrap();
        state.apply(Side::Player, Command::EndActions).unwrap();
        state.apply(Side::Player, Command::RepositionEmitter(3)).unwrap();
        state.apply(Side::Player, Command::Fire).unwrap();
        let events = state.drain_events();
        assert!(matches!(events[0], GameEvent::Rolled { side: Side::Player, .. }));
        assert!(matches!(events[1], GameEvent::EmitterRepositioned { .. }));
        assert!(matches!(events[2], GameEvent::BeamFired { .. }));
        assert_eq!(
            events.last(),
            Some(&GameEvent::MatchEnded {
                winner: Side::Player,
                score: 50
            })
        );
    }
}
