//! Prism Duel - a turn-based laser tactics game engine
//!
//! Core modules:
//! - `sim`: Deterministic rules core (board, beam tracing, turns, opponent)
//! - `settings`: Match configuration
//! - `summary`: End-of-match summary and leaderboard
//! - `commentary`: Flavor-text collaborator boundary with offline fallbacks

pub mod commentary;
pub mod settings;
pub mod sim;
pub mod summary;

pub use settings::MatchConfig;
pub use summary::{Leaderboard, MatchSummary};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Board side length
    pub const GRID_SIZE: i32 = 8;

    /// Hard ceiling on beam steps, guarantees termination
    pub const MAX_BEAM_STEPS: u32 = 50;

    /// Rejection-sampling attempts per batch of scattered pieces
    pub const PLACEMENT_ATTEMPTS: u32 = 100;

    /// Most neutral prisms or blocks per half
    pub const MAX_NEUTRALS_PER_HALF: u8 = 3;

    /// Fresh block integrity
    pub const BLOCK_INTEGRITY: u8 = 2;

    /// Action budget roll range (inclusive)
    pub const MIN_ROLL: u8 = 1;
    pub const MAX_ROLL: u8 = 3;

    /// Flat cost of a rotation
    pub const ROTATION_COST: u8 = 1;

    /// Scripted opponent gives up on its action phase after this many tries
    pub const OPPONENT_ACTION_ATTEMPTS: u32 = 20;

    /// Chance the scripted opponent rotates a prism instead of moving it
    pub const OPPONENT_ROTATE_CHANCE: f64 = 0.4;
}

/// True if `pos` lies on the board
#[inline]
pub fn in_bounds(pos: IVec2) -> bool {
    (0..consts::GRID_SIZE).contains(&pos.x) && (0..consts::GRID_SIZE).contains(&pos.y)
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> u32 {
    let d = (a - b).abs();
    (d.x + d.y) as u32
}
