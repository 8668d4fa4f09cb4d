//! Sides, orientations and the per-cell piece descriptor

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::BLOCK_INTEGRITY;

/// One of the two sides of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Human side, baseline at the bottom row
    Player,
    /// Scripted side, baseline at the top row
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// Row the side's Emitter travels along
    pub const fn baseline(self) -> i32 {
        match self {
            Side::Player => crate::consts::GRID_SIZE - 1,
            Side::Opponent => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Player => "Player",
            Side::Opponent => "Opponent",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete rotation state of a prism or emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg90,
        Orientation::Deg180,
        Orientation::Deg270,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }

    /// Parse a multiple of 90 (any other value is rejected)
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Orientation::Deg0),
            90 => Some(Orientation::Deg90),
            180 => Some(Orientation::Deg180),
            270 => Some(Orientation::Deg270),
            _ => None,
        }
    }

    /// Next state a quarter turn clockwise
    pub fn rotated_cw(self) -> Self {
        match self {
            Orientation::Deg0 => Orientation::Deg90,
            Orientation::Deg90 => Orientation::Deg180,
            Orientation::Deg180 => Orientation::Deg270,
            Orientation::Deg270 => Orientation::Deg0,
        }
    }

    /// The three states a rotate menu would offer
    pub fn alternatives(self) -> impl Iterator<Item = Orientation> {
        Self::ALL.into_iter().filter(move |&o| o != self)
    }
}

/// Piece kind, the descriptor view of [`Piece`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Empty,
    Generator,
    Prism,
    Block,
    Emitter,
}

/// Content of a single board cell
///
/// Prisms and blocks carry no side: they are always neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Piece {
    #[default]
    Empty,
    /// Win-condition target
    Generator { side: Side },
    /// Fires the side's beam
    Emitter { side: Side, orientation: Orientation },
    /// Reflects or refracts beams depending on orientation
    Prism { orientation: Orientation },
    /// Absorbs beams, cracking then breaking
    Block { integrity: u8 },
}

impl Piece {
    pub fn generator(side: Side) -> Self {
        Piece::Generator { side }
    }

    /// Emitter facing its side's firing direction
    pub fn emitter(side: Side) -> Self {
        let orientation = match side {
            Side::Player => Orientation::Deg0,
            Side::Opponent => Orientation::Deg180,
        };
        Piece::Emitter { side, orientation }
    }

    pub fn prism(orientation: Orientation) -> Self {
        Piece::Prism { orientation }
    }

    /// Block at full integrity
    pub fn block() -> Self {
        Piece::Block {
            integrity: BLOCK_INTEGRITY,
        }
    }

    pub fn kind(&self) -> PieceKind {
        match self {
            Piece::Empty => PieceKind::Empty,
            Piece::Generator { .. } => PieceKind::Generator,
            Piece::Emitter { .. } => PieceKind::Emitter,
            Piece::Prism { .. } => PieceKind::Prism,
            Piece::Block { .. } => PieceKind::Block,
        }
    }

    /// Owning side, `None` for neutral pieces and empty cells
    pub fn side(&self) -> Option<Side> {
        match self {
            Piece::Generator { side } | Piece::Emitter { side, .. } => Some(*side),
            _ => None,
        }
    }

    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            Piece::Prism { orientation } | Piece::Emitter { orientation, .. } => Some(*orientation),
            _ => None,
        }
    }

    pub fn integrity(&self) -> Option<u8> {
        match self {
            Piece::Block { integrity } => Some(*integrity),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Piece::Empty)
    }

    /// Only prisms may be rotated by an action
    pub fn is_rotatable(&self) -> bool {
        matches!(self, Piece::Prism { .. })
    }

    /// Single-character glyph for text dumps
    pub fn glyph(&self) -> char {
        match self {
            Piece::Empty => '.',
            Piece::Generator { side: Side::Player } => 'G',
            Piece::Generator { side: Side::Opponent } => 'g',
            Piece::Emitter { side: Side::Player, .. } => 'E',
            Piece::Emitter { side: Side::Opponent, .. } => 'e',
            Piece::Prism { orientation } => match orientation {
                Orientation::Deg0 => '◸',
                Orientation::Deg90 => '◺',
                Orientation::Deg180 => '◿',
                Orientation::Deg270 => '◹',
            },
            Piece::Block { integrity: 1 } => 'b',
            Piece::Block { .. } => 'B',
        }
    }
}
