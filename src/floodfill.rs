use std::collections::VecDeque;

use owo_colors::OwoColorize;

use crate::env::{Coord, Direction};
use crate::game::{Grid, SIZE};

const _: () = assert!(SIZE * SIZE <= u64::BITS as usize);

/// Set of board cells stored as a single bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Reachable(u64);

impl Reachable {
    pub fn contains(&self, p: Coord) -> bool {
        p.within() && self.0 & (1 << p.index()) != 0
    }

    pub fn insert(&mut self, p: Coord) {
        self.0 |= 1 << p.index();
    }

    pub fn remove(&mut self, p: Coord) {
        if p.within() {
            self.0 &= !(1 << p.index());
        }
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Cells in row major order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let i = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(Coord::from_index(i))
        })
    }
}

impl FromIterator<Coord> for Reachable {
    fn from_iter<T: IntoIterator<Item = Coord>>(iter: T) -> Self {
        let mut set = Reachable::default();
        for p in iter {
            set.insert(p);
        }
        set
    }
}

/// Returns every cell a token on `start` can walk to, excluding `start`.
///
/// Two neighbors are connected if both tiles are open towards each other.
/// The board edges do not wrap.
pub fn reachable_from(grid: &Grid, start: Coord) -> Reachable {
    let mut visited = Reachable::default();
    if !start.within() {
        return visited;
    }
    visited.insert(start);

    let mut queue = VecDeque::with_capacity(SIZE * SIZE);
    queue.push_back(start);
    while let Some(p) = queue.pop_front() {
        let shape = grid[p].shape;
        for d in Direction::iter() {
            let next = p.apply(d);
            if next.within()
                && !visited.contains(next)
                && shape.can_traverse(grid[next].shape, d)
            {
                visited.insert(next);
                queue.push_back(next);
            }
        }
    }

    visited.remove(start);
    visited
}

impl std::fmt::Debug for Reachable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Reachable {{")?;
        for r in 0..SIZE as i8 {
            write!(f, "  ")?;
            for c in 0..SIZE as i8 {
                if self.contains(Coord::new(r, c)) {
                    write!(f, "{} ", "x".green())?;
                } else {
                    write!(f, ". ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
