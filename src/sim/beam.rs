//! Beam propagation
//!
//! A beam advances one cell per step from its Emitter. Prisms reflect it by
//! 90 degrees off a leg, or refract it onto a fixed diagonal through the
//! hypotenuse. A refracted beam leaves the optical system after one more
//! step, so each shot refracts at most once.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::piece::{Orientation, Piece, Side};
use crate::consts::MAX_BEAM_STEPS;
use crate::in_bounds;

/// Eight compass directions; `Up` is toward row 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
    NE,
    SE,
    SW,
    NW,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
    ];

    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::NE,
        Direction::SE,
        Direction::SW,
        Direction::NW,
    ];

    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Right => IVec2::new(1, 0),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::NE => IVec2::new(1, -1),
            Direction::SE => IVec2::new(1, 1),
            Direction::SW => IVec2::new(-1, 1),
            Direction::NW => IVec2::new(-1, -1),
        }
    }

    /// Initial direction of a side's beam
    pub fn firing(side: Side) -> Self {
        match side {
            Side::Player => Direction::Up,
            Side::Opponent => Direction::Down,
        }
    }
}

/// Outcome of a beam entering a prism cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interaction {
    /// Bounced off a leg; the beam keeps travelling
    Reflect(Direction),
    /// Passed through the hypotenuse; the beam exits after one step
    Refract(Direction),
}

impl Interaction {
    pub fn direction(self) -> Direction {
        match self {
            Interaction::Reflect(dir) | Interaction::Refract(dir) => dir,
        }
    }
}

/// Optical rule table for a right-triangle prism
///
/// `None` means the prism absorbs the beam.
pub fn interact(orientation: Orientation, incoming: Direction) -> Option<Interaction> {
    use Direction::*;
    use Interaction::*;

    match (orientation, incoming) {
        (Orientation::Deg0, Up) => Some(Reflect(Left)),
        (Orientation::Deg0, Right) => Some(Reflect(Down)),
        (Orientation::Deg0, Down | Left | SW) => Some(Refract(SW)),

        (Orientation::Deg90, Down) => Some(Reflect(Left)),
        (Orientation::Deg90, Right) => Some(Reflect(Up)),
        (Orientation::Deg90, Up | Left | NW) => Some(Refract(NW)),

        (Orientation::Deg180, Down) => Some(Reflect(Right)),
        (Orientation::Deg180, Left) => Some(Reflect(Up)),
        (Orientation::Deg180, Up | Right | NE) => Some(Refract(NE)),

        (Orientation::Deg270, Up) => Some(Reflect(Right)),
        (Orientation::Deg270, Left) => Some(Reflect(Down)),
        (Orientation::Deg270, Down | Right | SE) => Some(Refract(SE)),

        _ => None,
    }
}

/// Why a trace stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Stepped off the board
    LeftBoard,
    /// Stopped by a block, an emitter or a prism with no matching rule
    Absorbed,
    /// Stopped on a generator
    StruckGenerator,
    /// One step after a refraction
    RefractionExit,
    /// Step ceiling reached
    StepLimit,
}

/// Result of firing a beam
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamTrace {
    /// Visited cells, starting at the launch cell; may end off-board
    pub path: Vec<IVec2>,
    /// Successful prism interactions (reflections and refractions)
    pub deflections: u32,
    pub termination: Termination,
}

impl BeamTrace {
    pub fn origin(&self) -> Option<IVec2> {
        self.path.first().copied()
    }

    /// Last visited cell if it lies on the board
    pub fn terminal(&self) -> Option<IVec2> {
        self.path.last().copied().filter(|&pos| in_bounds(pos))
    }

    pub fn left_board(&self) -> bool {
        self.termination == Termination::LeftBoard
    }
}

/// Fire `side`'s beam from its Emitter
pub fn trace_beam(board: &Board, side: Side) -> BeamTrace {
    trace_from(board, board.emitter(side), Direction::firing(side))
}

/// Trace a beam launched from `origin` travelling in `direction`
///
/// The origin cell itself is never interpreted.
pub fn trace_from(board: &Board, origin: IVec2, direction: Direction) -> BeamTrace {
    let mut path = vec![origin];
    let mut deflections = 0;
    let mut dir = direction;
    let mut pos = origin + dir.delta();
    let mut exit_next = false;
    let mut termination = Termination::StepLimit;

    for _ in 0..MAX_BEAM_STEPS {
        path.push(pos);
        let Some(piece) = board.piece_at(pos) else {
            termination = Termination::LeftBoard;
            break;
        };
        if exit_next {
            termination = Termination::RefractionExit;
            break;
        }

        match *piece {
            Piece::Block { .. } | Piece::Emitter { .. } => {
                termination = Termination::Absorbed;
                break;
            }
            Piece::Generator { .. } => {
                termination = Termination::StruckGenerator;
                break;
            }
            Piece::Prism { orientation } => match interact(orientation, dir) {
                Some(interaction) => {
                    dir = interaction.direction();
                    deflections += 1;
                    exit_next = matches!(interaction, Interaction::Refract(_));
                }
                None => {
                    termination = Termination::Absorbed;
                    break;
                }
            },
            Piece::Empty => {}
        }

        pos += dir.delta();
    }

    BeamTrace {
        path,
        deflections,
        termination,
    }
}
