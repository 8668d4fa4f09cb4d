//! Deterministic rules engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (row-major over the board)
//! - No rendering, audio or platform dependencies

pub mod beam;
pub mod board;
pub mod error;
pub mod opponent;
pub mod piece;
pub mod rules;
pub mod score;
pub mod state;
pub mod turn;

pub use beam::{BeamTrace, Direction, Interaction, Termination, interact, trace_beam, trace_from};
pub use board::{BlockDamage, Board, BoardBuilder};
pub use error::{MoveViolation, RuleError, SetupError};
pub use opponent::{ScriptedOpponent, TurnReport};
pub use piece::{Orientation, Piece, PieceKind, Side};
pub use rules::SelectionMode;
pub use score::calculate_score;
pub use state::{GameEvent, MatchState, Phase, Selection, TurnContext};
pub use turn::{Command, Outcome, Resolution};
