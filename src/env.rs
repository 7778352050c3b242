use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::agents::Agent;
use crate::game::{Game, Move, SIZE};

/// Cell position on the board. Row 0 is the top edge.
#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Coord {
        Coord { row, col }
    }

    /// Neighboring cell in the given direction. May leave the board.
    pub fn apply(self, d: Direction) -> Coord {
        let (dr, dc) = d.delta();
        Coord::new(self.row + dr, self.col + dc)
    }

    /// Wraps coordinates that left the board back onto the opposite edge.
    pub fn wrap(self) -> Coord {
        Coord::new(
            self.row.rem_euclid(SIZE as i8),
            self.col.rem_euclid(SIZE as i8),
        )
    }

    pub fn within(self) -> bool {
        0 <= self.row && self.row < SIZE as i8 && 0 <= self.col && self.col < SIZE as i8
    }

    pub fn manhattan(self, other: Coord) -> u32 {
        self.row.abs_diff(other.row) as u32 + self.col.abs_diff(other.col) as u32
    }

    pub fn is_border(self) -> bool {
        let last = SIZE as i8 - 1;
        self.within() && (self.row == 0 || self.row == last || self.col == 0 || self.col == last)
    }

    pub fn is_corner(self) -> bool {
        let last = SIZE as i8 - 1;
        (self.row == 0 || self.row == last) && (self.col == 0 || self.col == last)
    }

    /// The cell on the opposite edge of the same row or column.
    pub fn mirror(self) -> Coord {
        let last = SIZE as i8 - 1;
        let flip = |v: i8| match v {
            0 => last,
            v if v == last => 0,
            v => v,
        };
        Coord::new(flip(self.row), flip(self.col))
    }

    /// Direction in which the row or column is pushed when a tile is
    /// inserted at this border cell.
    pub fn push_direction(self) -> Option<Direction> {
        let last = SIZE as i8 - 1;
        if !self.is_border() || self.is_corner() {
            None
        } else if self.row == 0 {
            Some(Direction::Down)
        } else if self.row == last {
            Some(Direction::Up)
        } else if self.col == 0 {
            Some(Direction::Right)
        } else {
            Some(Direction::Left)
        }
    }

    /// Index into a row major cell array.
    pub fn index(self) -> usize {
        self.row as usize * SIZE + self.col as usize
    }

    pub fn from_index(i: usize) -> Coord {
        Coord::new((i / SIZE) as i8, (i % SIZE) as i8)
    }
}

impl From<(i8, i8)> for Coord {
    fn from(val: (i8, i8)) -> Self {
        Coord::new(val.0, val.1)
    }
}

impl Debug for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn iter() -> impl Iterator<Item = Direction> {
        [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ]
        .iter()
        .copied()
    }

    pub fn invert(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Row and column offset.
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// Single bit used by the connector masks.
    pub fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// The two sides of the game. Red moves first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    pub fn other(self) -> Color {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn iter() -> impl Iterator<Item = Color> {
        [Color::Red, Color::Blue].iter().copied()
    }
}

/// Snapshot handed to the engine by the surrounding game loop.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MoveRequest {
    pub game: Game,
    /// Overrides the configured agent.
    #[serde(default)]
    pub agent: Option<Agent>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveResponse {
    pub r#move: Option<Move>,
    pub score: f64,
}

impl MoveResponse {
    pub fn new(r#move: Option<Move>, score: f64) -> MoveResponse {
        MoveResponse { r#move, score }
    }
}
