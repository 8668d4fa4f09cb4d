//! Match state and turn bookkeeping
//!
//! `MatchState` is the single owner of the board, the action budget and the
//! random source. All mutation goes through the commands in `turn`.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::beam::BeamTrace;
use super::board::{BlockDamage, Board};
use super::piece::{Orientation, Side};
use super::rules::SelectionMode;
use crate::settings::MatchConfig;
use crate::summary::MatchSummary;

/// Current phase of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the action budget roll
    Roll,
    /// Spending action points on moves and rotations
    Act,
    /// Optional emitter repositioning, then firing
    Shoot,
    /// Interpreting the beam; never observed between commands
    Resolve,
    /// Match finished
    GameOver { winner: Side },
}

impl Phase {
    pub fn is_over(&self) -> bool {
        matches!(self, Phase::GameOver { .. })
    }
}

/// Authoritative turn bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnContext {
    pub active: Side,
    pub phase: Phase,
    /// Remaining action points
    pub action_points: u8,
    /// Result of the latest roll
    pub last_roll: Option<u8>,
    /// Completed turns that did not end the match
    pub turns: u32,
    /// Wall time in seconds, presentation only
    pub elapsed_secs: f64,
}

impl TurnContext {
    fn new() -> Self {
        Self {
            active: Side::Player,
            phase: Phase::Roll,
            action_points: 0,
            last_roll: None,
            turns: 0,
            elapsed_secs: 0.0,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }
}

/// Piece picked during the act phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub pos: IVec2,
    pub mode: SelectionMode,
}

/// Outbound notifications, queued after each state transition
///
/// Hosts drain these for animation, sound and commentary; the rules core
/// never waits on anyone reading them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Rolled { side: Side, value: u8 },
    PieceMoved { side: Side, from: IVec2, to: IVec2, cost: u8 },
    PieceRotated { side: Side, pos: IVec2, orientation: Orientation },
    EmitterRepositioned { side: Side, to: IVec2 },
    BeamFired { side: Side, trace: BeamTrace },
    BlockCracked { pos: IVec2, integrity: u8 },
    BlockDestroyed { pos: IVec2 },
    TurnPassed { to: Side, turn: u32 },
    Surrendered { side: Side },
    MatchEnded { winner: Side, score: u64 },
}

impl GameEvent {
    pub(crate) fn from_damage(pos: IVec2, damage: BlockDamage) -> Self {
        match damage {
            BlockDamage::Cracked { integrity } => GameEvent::BlockCracked { pos, integrity },
            BlockDamage::Destroyed => GameEvent::BlockDestroyed { pos },
        }
    }
}

/// Complete match state (deterministic for a given seed and command stream)
#[derive(Debug, Clone)]
pub struct MatchState {
    pub(crate) config: MatchConfig,
    pub(crate) board: Board,
    pub(crate) turn: TurnContext,
    pub(crate) selection: Option<Selection>,
    pub(crate) last_trace: Option<BeamTrace>,
    pub(crate) score: u64,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl MatchState {
    /// New match with a generated board
    ///
    /// `seed` overrides any seed in `config`; the one used is kept in the
    /// stored config so the match can be replayed.
    pub fn new(config: MatchConfig, seed: u64) -> Self {
        let config = config.with_seed(seed);
        let mut rng = Pcg32::seed_from_u64(seed);
        let board = Board::generate(&config, &mut rng);
        log::info!(
            "Match start: seed={seed} prisms={} blocks={}",
            config.prism_count,
            config.block_count
        );
        Self::with_rng(config, board, rng)
    }

    /// New match on a prepared board
    pub fn from_board(config: MatchConfig, board: Board, seed: u64) -> Self {
        Self::with_rng(config, board, Pcg32::seed_from_u64(seed))
    }

    /// New match with an injected random source
    pub fn with_rng(config: MatchConfig, board: Board, rng: Pcg32) -> Self {
        Self {
            config,
            board,
            turn: TurnContext::new(),
            selection: None,
            last_trace: None,
            score: 0,
            events: Vec::new(),
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> &TurnContext {
        &self.turn
    }

    pub fn phase(&self) -> Phase {
        self.turn.phase
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn last_trace(&self) -> Option<&BeamTrace> {
        self.last_trace.as_ref()
    }

    pub fn winner(&self) -> Option<Side> {
        self.turn.winner()
    }

    /// Winning-shot score; 0 unless the Player won by firing
    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.turn.phase.is_over()
    }

    /// True when `side` is the one expected to act
    pub fn awaiting(&self, side: Side) -> bool {
        !self.is_over() && self.turn.active == side
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the presentation clock while the match is live
    pub fn advance_clock(&mut self, secs: f64) {
        if !self.is_over() && secs > 0.0 {
            self.turn.elapsed_secs += secs;
        }
    }

    /// Read-only end-of-match projection
    pub fn summary(&self) -> Option<MatchSummary> {
        let winner = self.winner()?;
        Some(MatchSummary {
            duration_secs: self.turn.elapsed_secs.floor() as u64,
            turns: self.turn.turns,
            winner,
            prism_count: self.config.prism_count,
            block_count: self.config.block_count,
            score: self.score,
        })
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
