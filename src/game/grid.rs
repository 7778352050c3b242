use std::fmt;
use std::ops::{Index, IndexMut};

use owo_colors::OwoColorize;
use thiserror::Error;

use super::{Tile, Waypoint};
use crate::env::Coord;

/// Side length of the square board.
pub const SIZE: usize = 7;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("expected 7 rows, got {0}")]
    Rows(usize),
    #[error("row {0} has {1} tiles, expected 7")]
    Columns(usize, usize),
}

/// The fixed 7x7 tile layout.
///
/// Stored inline so that copying a game state is a plain memcpy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "Vec<Vec<Tile>>", try_from = "Vec<Vec<Tile>>")]
pub struct Grid {
    cells: [Tile; SIZE * SIZE],
}

impl Default for Grid {
    fn default() -> Grid {
        Grid {
            cells: [Tile::default(); SIZE * SIZE],
        }
    }
}

impl Grid {
    /// Pushes `tile` into the board at the border cell `at`, moving the whole
    /// row or column by one. Returns the tile pushed out at the opposite end,
    /// or `None` without touching the board if `at` is a corner or not on the
    /// border.
    pub fn shift(&mut self, at: Coord, tile: Tile) -> Option<Tile> {
        let (dr, dc) = at.push_direction()?.delta();

        let end = at.mirror();
        let ejected = self[end];
        let mut p = end;
        while p != at {
            let prev = Coord::new(p.row - dr, p.col - dc);
            self[p] = self[prev];
            p = prev;
        }
        self[at] = tile;
        Some(ejected)
    }

    /// Current position of a waypoint tile.
    pub fn find(&self, waypoint: Waypoint) -> Option<Coord> {
        self.cells
            .iter()
            .position(|t| t.waypoint == Some(waypoint))
            .map(Coord::from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, t)| (Coord::from_index(i), t))
    }
}

impl Index<Coord> for Grid {
    type Output = Tile;

    fn index(&self, p: Coord) -> &Self::Output {
        debug_assert!(p.within(), "{p:?}");
        &self.cells[p.index()]
    }
}

impl IndexMut<Coord> for Grid {
    fn index_mut(&mut self, p: Coord) -> &mut Self::Output {
        debug_assert!(p.within(), "{p:?}");
        &mut self.cells[p.index()]
    }
}

impl From<Grid> for Vec<Vec<Tile>> {
    fn from(grid: Grid) -> Self {
        grid.cells.chunks(SIZE).map(|r| r.to_vec()).collect()
    }
}

impl TryFrom<Vec<Vec<Tile>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self, Self::Error> {
        if rows.len() != SIZE {
            return Err(GridError::Rows(rows.len()));
        }
        let mut grid = Grid::default();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != SIZE {
                return Err(GridError::Columns(r, row.len()));
            }
            grid.cells[r * SIZE..(r + 1) * SIZE].copy_from_slice(row);
        }
        Ok(grid)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{")?;
        for row in self.cells.chunks(SIZE) {
            write!(f, "  ")?;
            for tile in row {
                match tile.waypoint {
                    Some(w) => write!(f, "{}{} ", tile.shape.glyph(), w.symbol().yellow())?,
                    None => write!(f, "{}  ", tile.shape.glyph())?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::Shape;

    fn numbered() -> Grid {
        let mut grid = Grid::default();
        for i in 0..SIZE * SIZE {
            grid.cells[i] = Tile::new(Shape::ALL[i % Shape::ALL.len()]);
        }
        grid
    }

    #[test]
    fn grid_size() {
        use std::mem;
        println!("Tile: {}", mem::size_of::<Tile>());
        println!("Grid: {}", mem::size_of::<Grid>());
        assert!(mem::size_of::<Grid>() <= 2 * SIZE * SIZE);
    }

    #[test]
    fn grid_shift_row() {
        let original = numbered();
        let mut grid = original;
        let spare = Tile::with_waypoint(Shape::TeeUp, Waypoint::Moon);

        let ejected = grid.shift(Coord::new(3, 0), spare).unwrap();
        println!("{grid:?}");
        assert_eq!(ejected, original[Coord::new(3, 6)]);
        assert_eq!(grid[Coord::new(3, 0)], spare);
        for c in 1..SIZE as i8 {
            assert_eq!(grid[Coord::new(3, c)], original[Coord::new(3, c - 1)]);
        }
        // other rows untouched
        assert_eq!(grid[Coord::new(2, 4)], original[Coord::new(2, 4)]);
    }

    #[test]
    fn grid_shift_column_up() {
        let original = numbered();
        let mut grid = original;
        let spare = Tile::new(Shape::Vertical);

        let ejected = grid.shift(Coord::new(6, 5), spare).unwrap();
        assert_eq!(ejected, original[Coord::new(0, 5)]);
        assert_eq!(grid[Coord::new(6, 5)], spare);
        for r in 0..SIZE as i8 - 1 {
            assert_eq!(grid[Coord::new(r, 5)], original[Coord::new(r + 1, 5)]);
        }
    }

    #[test]
    fn grid_find_follows_tile() {
        let mut grid = Grid::default();
        grid[Coord::new(1, 3)] = Tile::with_waypoint(Shape::TeeDown, Waypoint::Mountain);
        assert_eq!(grid.find(Waypoint::Mountain), Some(Coord::new(1, 3)));
        grid.shift(Coord::new(0, 3), Tile::default());
        assert_eq!(grid.find(Waypoint::Mountain), Some(Coord::new(2, 3)));
        assert_eq!(grid.find(Waypoint::Sun), None);
        assert_eq!(grid.shift(Coord::new(0, 0), Tile::default()), None);
    }

    #[test]
    fn grid_json() {
        let grid = numbered();
        let json = serde_json::to_string(&grid).unwrap();
        let back: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(grid, back);

        let err = Grid::try_from(vec![vec![Tile::default(); SIZE]; 3]).unwrap_err();
        assert_eq!(err, GridError::Rows(3));
    }
}
