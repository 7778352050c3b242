use serde::{Deserialize, Serialize};

use crate::env::Direction;

const UP: u8 = 1 << Direction::Up as u8;
const RIGHT: u8 = 1 << Direction::Right as u8;
const DOWN: u8 = 1 << Direction::Down as u8;
const LEFT: u8 = 1 << Direction::Left as u8;

/// Connector pattern printed on a tile.
///
/// The corner and T-junction variants are named after the edges they open
/// towards; a T-junction is open on three sides and closed opposite its name.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Shape {
    #[serde(rename = "horizontal")]
    Horizontal,
    #[serde(rename = "vertical")]
    Vertical,
    #[serde(rename = "L-up-right")]
    CornerUpRight,
    #[serde(rename = "L-up-left")]
    CornerUpLeft,
    #[serde(rename = "L-down-right")]
    CornerDownRight,
    #[serde(rename = "L-down-left")]
    CornerDownLeft,
    #[serde(rename = "T-up")]
    TeeUp,
    #[serde(rename = "T-right")]
    TeeRight,
    #[serde(rename = "T-down")]
    TeeDown,
    #[serde(rename = "T-left")]
    TeeLeft,
}

impl Shape {
    pub const ALL: [Shape; 10] = [
        Shape::Horizontal,
        Shape::Vertical,
        Shape::CornerUpRight,
        Shape::CornerUpLeft,
        Shape::CornerDownRight,
        Shape::CornerDownLeft,
        Shape::TeeUp,
        Shape::TeeRight,
        Shape::TeeDown,
        Shape::TeeLeft,
    ];

    /// Bitmask of the open edges, one bit per `Direction`.
    pub fn openings(self) -> u8 {
        match self {
            Shape::Horizontal => LEFT | RIGHT,
            Shape::Vertical => UP | DOWN,
            Shape::CornerUpRight => UP | RIGHT,
            Shape::CornerUpLeft => UP | LEFT,
            Shape::CornerDownRight => DOWN | RIGHT,
            Shape::CornerDownLeft => DOWN | LEFT,
            Shape::TeeUp => UP | LEFT | RIGHT,
            Shape::TeeRight => UP | DOWN | RIGHT,
            Shape::TeeDown => DOWN | LEFT | RIGHT,
            Shape::TeeLeft => UP | DOWN | LEFT,
        }
    }

    pub fn opens(self, d: Direction) -> bool {
        self.openings() & d.bit() != 0
    }

    /// Returns if a token can pass from a tile of this shape to the adjacent
    /// tile `other` lying in direction `d`.
    ///
    /// Both edges have to be open, so `a.can_traverse(b, d)` always equals
    /// `b.can_traverse(a, d.invert())`.
    pub fn can_traverse(self, other: Shape, d: Direction) -> bool {
        self.opens(d) && other.opens(d.invert())
    }

    pub fn glyph(self) -> char {
        match self {
            Shape::Horizontal => '─',
            Shape::Vertical => '│',
            Shape::CornerUpRight => '└',
            Shape::CornerUpLeft => '┘',
            Shape::CornerDownRight => '┌',
            Shape::CornerDownLeft => '┐',
            Shape::TeeUp => '┴',
            Shape::TeeRight => '├',
            Shape::TeeDown => '┬',
            Shape::TeeLeft => '┤',
        }
    }

    pub fn from_glyph(c: char) -> Option<Shape> {
        Shape::ALL.iter().copied().find(|s| s.glyph() == c)
    }
}

/// Goal markers printed on some tiles.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Waypoint {
    Sun,
    Moon,
    Galaxy,
    Mountain,
}

impl Waypoint {
    pub const ALL: [Waypoint; 4] = [
        Waypoint::Sun,
        Waypoint::Moon,
        Waypoint::Galaxy,
        Waypoint::Mountain,
    ];

    pub fn symbol(self) -> char {
        match self {
            Waypoint::Sun => 's',
            Waypoint::Moon => 'o',
            Waypoint::Galaxy => 'g',
            Waypoint::Mountain => 'm',
        }
    }

    pub fn from_symbol(c: char) -> Option<Waypoint> {
        Waypoint::ALL.iter().copied().find(|w| w.symbol() == c)
    }
}

/// A single maze tile. Waypoints are printed on the tile and travel with it.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Tile {
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint: Option<Waypoint>,
}

impl Tile {
    pub const fn new(shape: Shape) -> Tile {
        Tile {
            shape,
            waypoint: None,
        }
    }

    pub const fn with_waypoint(shape: Shape, waypoint: Waypoint) -> Tile {
        Tile {
            shape,
            waypoint: Some(waypoint),
        }
    }
}

impl Default for Tile {
    fn default() -> Tile {
        Tile::new(Shape::Horizontal)
    }
}
