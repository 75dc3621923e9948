use rand::{Rng, seq::SliceRandom};

use crate::error::MazeError;

/// Grid coordinate `(x, y)`. Signed so that a step off the edge is representable.
pub type Coord = (i32, i32);

/// The four sides of a cell, in clockwise order starting from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self, MazeError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(MazeError::InvalidDirection(index))
    }

    /// `(d + 2) mod 4`
    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 2) % 4]
    }

    /// Quarter turn counter-clockwise, i.e. "left" for a walker heading `self`.
    pub fn turn_left(self) -> Self {
        Self::ALL[(self.index() + 3) % 4]
    }

    /// Quarter turn clockwise.
    pub fn turn_right(self) -> Self {
        Self::ALL[(self.index() + 1) % 4]
    }

    /// Left and right sides carry the y-axis openings, top and bottom the x-axis ones.
    pub fn is_horizontal_side(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Direction of the unit move from `from` to `to`, if they are orthogonal neighbors.
    pub fn between(from: Coord, to: Coord) -> Option<Self> {
        match (to.0 - from.0, to.1 - from.1) {
            (0, -1) => Some(Direction::Top),
            (1, 0) => Some(Direction::Right),
            (0, 1) => Some(Direction::Bottom),
            (-1, 0) => Some(Direction::Left),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Top => write!(f, "top"),
            Direction::Right => write!(f, "right"),
            Direction::Bottom => write!(f, "bottom"),
            Direction::Left => write!(f, "left"),
        }
    }
}

/// Move one cell from `(x, y)` in `direction`. The result may lie outside the grid.
pub fn take_step(direction: Direction, x: i32, y: i32) -> Coord {
    match direction {
        Direction::Top => (x, y - 1),
        Direction::Right => (x + 1, y),
        Direction::Bottom => (x, y + 1),
        Direction::Left => (x - 1, y),
    }
}

/// A uniformly random permutation of the four directions.
pub fn shuffled_directions<R: Rng + ?Sized>(rng: &mut R) -> [Direction; 4] {
    let mut directions = Direction::ALL;
    directions.shuffle(rng);
    directions
}
