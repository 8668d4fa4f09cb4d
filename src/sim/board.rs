//! Board model: an owned grid of pieces behind controlled mutation
//!
//! Cells are private. Placement happens through [`BoardBuilder`] (or
//! [`Board::generate`]); after that only moves, rotations and beam damage
//! change the grid.

use std::fmt;

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{MoveViolation, RuleError, SetupError};
use super::piece::{Orientation, Piece, Side};
use crate::consts::{GRID_SIZE, PLACEMENT_ATTEMPTS};
use crate::in_bounds;
use crate::settings::MatchConfig;

/// Opponent emitter start cell
pub const OPPONENT_EMITTER_START: IVec2 = IVec2::new(0, Side::Opponent.baseline());
/// Opponent generator cell
pub const OPPONENT_GENERATOR: IVec2 = IVec2::new(3, Side::Opponent.baseline());
/// Player generator cell
pub const PLAYER_GENERATOR: IVec2 = IVec2::new(4, Side::Player.baseline());
/// Player emitter start cell
pub const PLAYER_EMITTER_START: IVec2 = IVec2::new(GRID_SIZE - 1, Side::Player.baseline());

/// Rows neutral pieces may be scattered into, per half
const PLAYER_HALF_ROWS: [i32; 3] = [4, 5, 6];
const OPPONENT_HALF_ROWS: [i32; 3] = [1, 2, 3];

/// What a beam hit did to a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockDamage {
    /// Block survives with this integrity
    Cracked { integrity: u8 },
    /// Block removed, cell is now empty
    Destroyed,
}

/// Fixed-size square grid, row-major
///
/// Deserialization only trusts the cells and rebuilds the tracked positions
/// through [`BoardBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardCells")]
pub struct Board {
    cells: Vec<Piece>,
    /// Emitter cells indexed by [`side_index`]
    emitters: [IVec2; 2],
    /// Generator cells indexed by [`side_index`]
    generators: [IVec2; 2],
}

/// Wire form accepted when deserializing a [`Board`]
#[derive(Deserialize)]
struct BoardCells {
    cells: Vec<Piece>,
}

impl TryFrom<BoardCells> for Board {
    type Error = SetupError;

    fn try_from(raw: BoardCells) -> Result<Self, Self::Error> {
        let expected = (GRID_SIZE * GRID_SIZE) as usize;
        if raw.cells.len() != expected {
            return Err(SetupError::CellCount {
                expected,
                found: raw.cells.len(),
            });
        }
        BoardBuilder { cells: raw.cells }.build()
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Player => 0,
        Side::Opponent => 1,
    }
}

fn cell_index(pos: IVec2) -> usize {
    (pos.y * GRID_SIZE + pos.x) as usize
}

impl Board {
    pub fn builder() -> BoardBuilder {
        BoardBuilder::new()
    }

    /// Fixed generators and emitters plus randomly scattered neutrals
    pub fn generate(config: &MatchConfig, rng: &mut impl Rng) -> Self {
        let mut builder = BoardBuilder::with_standard_pieces();

        builder.scatter(rng, config.prism_count, &PLAYER_HALF_ROWS, |rng| {
            Piece::prism(random_orientation(rng))
        });
        builder.scatter(rng, config.block_count, &PLAYER_HALF_ROWS, |_| Piece::block());
        builder.scatter(rng, config.prism_count, &OPPONENT_HALF_ROWS, |rng| {
            Piece::prism(random_orientation(rng))
        });
        builder.scatter(rng, config.block_count, &OPPONENT_HALF_ROWS, |_| Piece::block());

        builder.finish()
    }

    /// Piece at `pos`
    pub fn get(&self, pos: IVec2) -> Result<&Piece, RuleError> {
        if !in_bounds(pos) {
            return Err(RuleError::OutOfBounds(pos));
        }
        Ok(&self.cells[cell_index(pos)])
    }

    /// Piece at `pos`, `None` off the board
    pub fn piece_at(&self, pos: IVec2) -> Option<&Piece> {
        in_bounds(pos).then(|| &self.cells[cell_index(pos)])
    }

    /// True for in-bounds empty cells
    pub fn is_empty(&self, pos: IVec2) -> bool {
        self.piece_at(pos).is_some_and(Piece::is_empty)
    }

    pub fn emitter(&self, side: Side) -> IVec2 {
        self.emitters[side_index(side)]
    }

    pub fn generator(&self, side: Side) -> IVec2 {
        self.generators[side_index(side)]
    }

    /// Relocate a piece, leaving an empty cell behind
    pub fn move_piece(&mut self, from: IVec2, to: IVec2) -> Result<(), RuleError> {
        let piece = *self.get(from)?;
        if !self.get(to)?.is_empty() {
            return Err(MoveViolation::Occupied.into());
        }
        if piece.is_empty() {
            return Err(MoveViolation::NoPiece.into());
        }

        self.cells[cell_index(to)] = piece;
        self.cells[cell_index(from)] = Piece::Empty;
        match piece {
            Piece::Emitter { side, .. } => self.emitters[side_index(side)] = to,
            Piece::Generator { side } => self.generators[side_index(side)] = to,
            _ => {}
        }
        Ok(())
    }

    pub fn set_orientation(&mut self, pos: IVec2, orientation: Orientation) -> Result<(), RuleError> {
        self.get(pos)?;
        match &mut self.cells[cell_index(pos)] {
            Piece::Prism { orientation: current } => {
                *current = orientation;
                Ok(())
            }
            _ => Err(RuleError::NotRotatable(pos)),
        }
    }

    /// Apply one beam hit to the block at `pos`
    ///
    /// Returns `None` if the cell holds no block.
    pub(crate) fn damage_block(&mut self, pos: IVec2) -> Option<BlockDamage> {
        let cell = &mut self.cells[cell_index(pos)];
        let Piece::Block { integrity } = cell else {
            return None;
        };
        let remaining = integrity.saturating_sub(1);
        if remaining == 0 {
            *cell = Piece::Empty;
            Some(BlockDamage::Destroyed)
        } else {
            *integrity = remaining;
            Some(BlockDamage::Cracked {
                integrity: remaining,
            })
        }
    }

    /// All cells with their positions, row-major
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Piece)> {
        self.cells.iter().enumerate().map(|(idx, piece)| {
            let idx = idx as i32;
            (IVec2::new(idx % GRID_SIZE, idx / GRID_SIZE), piece)
        })
    }

    /// Occupied cells only
    pub fn pieces(&self) -> impl Iterator<Item = (IVec2, &Piece)> {
        self.iter().filter(|(_, piece)| !piece.is_empty())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(GRID_SIZE as usize) {
            for piece in row {
                write!(f, "{}", piece.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn random_orientation(rng: &mut impl Rng) -> Orientation {
    Orientation::ALL[rng.random_range(0..Orientation::ALL.len())]
}

/// Construction-time placement
#[derive(Debug, Clone)]
pub struct BoardBuilder {
    cells: Vec<Piece>,
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardBuilder {
    /// Entirely empty grid
    pub fn new() -> Self {
        Self {
            cells: vec![Piece::Empty; (GRID_SIZE * GRID_SIZE) as usize],
        }
    }

    /// Grid with both generators and emitters at their mirrored start cells
    pub fn with_standard_pieces() -> Self {
        let mut builder = Self::new();
        builder.put(OPPONENT_EMITTER_START, Piece::emitter(Side::Opponent));
        builder.put(OPPONENT_GENERATOR, Piece::generator(Side::Opponent));
        builder.put(PLAYER_GENERATOR, Piece::generator(Side::Player));
        builder.put(PLAYER_EMITTER_START, Piece::emitter(Side::Player));
        builder
    }

    /// Place `piece`, replacing whatever was there
    pub fn place(mut self, pos: IVec2, piece: Piece) -> Result<Self, SetupError> {
        if !in_bounds(pos) {
            return Err(SetupError::OutOfBounds(pos));
        }
        self.put(pos, piece);
        Ok(self)
    }

    fn put(&mut self, pos: IVec2, piece: Piece) {
        self.cells[cell_index(pos)] = piece;
    }

    /// Rejection sampling: random row from `rows`, random column, empty cells only
    ///
    /// Gives up after [`PLACEMENT_ATTEMPTS`] tries and returns how many landed.
    fn scatter<R: Rng>(
        &mut self,
        rng: &mut R,
        count: u8,
        rows: &[i32],
        mut make: impl FnMut(&mut R) -> Piece,
    ) -> u8 {
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < PLACEMENT_ATTEMPTS {
            let y = rows[rng.random_range(0..rows.len())];
            let x = rng.random_range(0..GRID_SIZE);
            let pos = IVec2::new(x, y);
            if self.cells[cell_index(pos)].is_empty() {
                let piece = make(rng);
                self.put(pos, piece);
                placed += 1;
            }
            attempts += 1;
        }
        if placed < count {
            log::debug!("Placed {placed}/{count} pieces in rows {rows:?}");
        }
        placed
    }

    /// Validate the one-generator/one-emitter-per-side invariant
    pub fn build(self) -> Result<Board, SetupError> {
        let mut emitters = [Vec::new(), Vec::new()];
        let mut generators = [Vec::new(), Vec::new()];
        for (idx, piece) in self.cells.iter().enumerate() {
            let idx = idx as i32;
            let pos = IVec2::new(idx % GRID_SIZE, idx / GRID_SIZE);
            match piece {
                Piece::Emitter { side, .. } => emitters[side_index(*side)].push(pos),
                Piece::Generator { side } => generators[side_index(*side)].push(pos),
                _ => {}
            }
        }

        for side in [Side::Player, Side::Opponent] {
            let found = generators[side_index(side)].len();
            if found != 1 {
                return Err(SetupError::GeneratorCount { side, found });
            }
            let found = emitters[side_index(side)].len();
            if found != 1 {
                return Err(SetupError::EmitterCount { side, found });
            }
        }

        Ok(Board {
            cells: self.cells,
            emitters: [emitters[0][0], emitters[1][0]],
            generators: [generators[0][0], generators[1][0]],
        })
    }

    /// Standard layout always satisfies the invariant
    fn finish(self) -> Board {
        let Self { cells } = self;
        Board {
            cells,
            emitters: [PLAYER_EMITTER_START, OPPONENT_EMITTER_START],
            generators: [PLAYER_GENERATOR, OPPONENT_GENERATOR],
        }
    }
}
