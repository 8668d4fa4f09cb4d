//! Rule violations and setup errors
//!
//! Every `RuleError` is recoverable: the command is rejected and the match
//! state is left untouched.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::piece::Side;
use super::state::Phase;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    #[error("cell {0} is outside the board")]
    OutOfBounds(IVec2),
    #[error("illegal move: {0}")]
    IllegalMove(#[from] MoveViolation),
    #[error("piece at {0} cannot be rotated")]
    NotRotatable(IVec2),
    #[error("action requires the {expected:?} phase, match is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("it is not {0}'s turn")]
    NotYourTurn(Side),
}

/// Why a move or rotation was refused
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveViolation {
    #[error("piece is not selectable by the active side")]
    NotSelectable,
    #[error("no piece is selected")]
    NothingSelected,
    #[error("no piece to move")]
    NoPiece,
    #[error("destination is occupied")]
    Occupied,
    #[error("destination is not on the same row or column")]
    NotCollinear,
    #[error("destination is the current cell")]
    NoDistance,
    #[error("path to the destination is blocked")]
    PathBlocked,
    #[error("needs {needed} AP, {available} left")]
    InsufficientBudget { needed: u32, available: u8 },
    #[error("piece already has that orientation")]
    Unchanged,
}

/// Board construction invariant violations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    #[error("cell {0} is outside the board")]
    OutOfBounds(IVec2),
    #[error("{side} needs exactly one generator, found {found}")]
    GeneratorCount { side: Side, found: usize },
    #[error("{side} needs exactly one emitter, found {found}")]
    EmitterCount { side: Side, found: usize },
    #[error("board needs {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },
}
