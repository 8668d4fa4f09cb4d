//! Move and rotation legality
//!
//! Pure checks against a board snapshot. Nothing here mutates state; the
//! turn machine applies a validated action afterwards.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::error::{MoveViolation, RuleError};
use super::piece::{Orientation, Piece, Side};
use crate::consts::ROTATION_COST;
use crate::{in_bounds, manhattan};

/// Actions a selected piece offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Blocks: relocation only
    Move,
    /// Prisms: relocation or rotation
    MoveOrRotate,
}

/// How the active side may act on `piece`, `None` if it cannot select it
///
/// Generators never move and emitters only move during the shoot phase, so
/// only neutral prisms and blocks are selectable, by either side.
pub fn selection_mode(piece: &Piece) -> Option<SelectionMode> {
    match piece {
        Piece::Prism { .. } => Some(SelectionMode::MoveOrRotate),
        Piece::Block { .. } => Some(SelectionMode::Move),
        Piece::Empty | Piece::Generator { .. } | Piece::Emitter { .. } => None,
    }
}

pub fn is_selectable(board: &Board, pos: IVec2) -> bool {
    board
        .piece_at(pos)
        .and_then(selection_mode)
        .is_some()
}

/// Every cell the active side could select right now
pub fn selectable_cells(board: &Board) -> Vec<IVec2> {
    board
        .pieces()
        .filter(|(_, piece)| selection_mode(piece).is_some())
        .map(|(pos, _)| pos)
        .collect()
}

/// Check a straight-line move and return its AP cost
pub fn validate_move(board: &Board, from: IVec2, to: IVec2, budget: u8) -> Result<u8, RuleError> {
    if !in_bounds(to) {
        return Err(RuleError::OutOfBounds(to));
    }
    if board.get(from)?.is_empty() {
        return Err(MoveViolation::NoPiece.into());
    }
    if from == to {
        return Err(MoveViolation::NoDistance.into());
    }
    if !board.is_empty(to) {
        return Err(MoveViolation::Occupied.into());
    }
    if from.x != to.x && from.y != to.y {
        return Err(MoveViolation::NotCollinear.into());
    }

    let distance = manhattan(from, to);
    if distance > u32::from(budget) {
        return Err(MoveViolation::InsufficientBudget {
            needed: distance,
            available: budget,
        }
        .into());
    }

    let step = (to - from).signum();
    let mut cell = from + step;
    while cell != to {
        if !board.is_empty(cell) {
            return Err(MoveViolation::PathBlocked.into());
        }
        cell += step;
    }

    // Bounded by budget, which is a u8
    Ok(distance as u8)
}

/// Check a rotation and return its AP cost
pub fn validate_rotation(
    board: &Board,
    pos: IVec2,
    orientation: Orientation,
    budget: u8,
) -> Result<u8, RuleError> {
    let piece = board.get(pos)?;
    if !piece.is_rotatable() {
        return Err(RuleError::NotRotatable(pos));
    }
    if piece.orientation() == Some(orientation) {
        return Err(MoveViolation::Unchanged.into());
    }
    if budget < ROTATION_COST {
        return Err(MoveViolation::InsufficientBudget {
            needed: u32::from(ROTATION_COST),
            available: budget,
        }
        .into());
    }
    Ok(ROTATION_COST)
}

/// Check an emitter relocation along its own baseline
pub fn validate_reposition(board: &Board, side: Side, column: i32) -> Result<IVec2, RuleError> {
    let from = board.emitter(side);
    let to = IVec2::new(column, from.y);
    if !in_bounds(to) {
        return Err(RuleError::OutOfBounds(to));
    }
    if to != from && !board.is_empty(to) {
        return Err(MoveViolation::Occupied.into());
    }
    Ok(to)
}

/// Empty columns on `side`'s baseline the emitter could move to
pub fn open_baseline_columns(board: &Board, side: Side) -> Vec<i32> {
    let row = board.emitter(side).y;
    (0..crate::consts::GRID_SIZE)
        .filter(|&x| board.is_empty(IVec2::new(x, row)))
        .collect()
}
