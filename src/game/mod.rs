mod game;
pub use game::*;
mod grid;
pub use grid::*;
mod moves;
pub use moves::*;
mod tile;
pub use tile::*;

#[cfg(test)]
pub(crate) use moves::test::played;
