use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::env::Color;
use crate::game::{Game, Shape, Waypoint, SIZE};

/// Random seed used to compute Zobrist hashes.
pub const SEED: u64 = 1200;

/// Which parts of the state are folded into the position hash.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HashKey {
    /// Every field that influences the search result.
    #[default]
    Full,
    /// Token occupancy only. States that differ in tiles, cursors or the
    /// blocked insertion collide.
    Occupancy,
}

type CellTable<const N: usize> = [[[u64; N]; SIZE]; SIZE];

/// Pre-computed random values for each state feature.
#[derive(Clone)]
pub struct Zobrist {
    tokens: CellTable<2>,
    shapes: CellTable<10>,
    waypoints: CellTable<4>,
    last_insertion: [[u64; SIZE]; SIZE],
    progress: [[u64; 5]; 2],
    spares: [[u64; 10]; 2],
    winner: [u64; 2],
    blue_to_move: u64,
}

impl std::fmt::Debug for Zobrist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zobrist").finish_non_exhaustive()
    }
}

impl Default for Zobrist {
    fn default() -> Self {
        Zobrist::new(SEED)
    }
}

fn cell_table<const N: usize>(rng: &mut SmallRng) -> CellTable<N> {
    let mut table = [[[0; N]; SIZE]; SIZE];
    for row in &mut table {
        for cell in row {
            for v in cell {
                *v = rng.gen();
            }
        }
    }
    table
}

fn shape_index(shape: Shape) -> usize {
    Shape::ALL.iter().position(|&s| s == shape).unwrap_or_default()
}

fn waypoint_index(waypoint: Waypoint) -> usize {
    Waypoint::ALL
        .iter()
        .position(|&w| w == waypoint)
        .unwrap_or_default()
}

impl Zobrist {
    pub fn new(seed: u64) -> Zobrist {
        let mut rng = SmallRng::seed_from_u64(seed);
        let tokens = cell_table(&mut rng);
        let shapes = cell_table(&mut rng);
        let waypoints = cell_table(&mut rng);
        let mut last_insertion = [[0; SIZE]; SIZE];
        for v in last_insertion.iter_mut().flatten() {
            *v = rng.gen();
        }
        let mut progress = [[0; 5]; 2];
        for v in progress.iter_mut().flatten() {
            *v = rng.gen();
        }
        let mut spares = [[0; 10]; 2];
        for v in spares.iter_mut().flatten() {
            *v = rng.gen();
        }
        Zobrist {
            tokens,
            shapes,
            waypoints,
            last_insertion,
            progress,
            spares,
            winner: [rng.gen(), rng.gen()],
            blue_to_move: rng.gen(),
        }
    }

    pub fn hash(&self, game: &Game, key: HashKey) -> u64 {
        match key {
            HashKey::Full => self.full(game),
            HashKey::Occupancy => self.occupancy(game),
        }
    }

    /// XOR over the token of each occupied cell.
    pub fn occupancy(&self, game: &Game) -> u64 {
        let mut hash = 0;
        for color in Color::iter() {
            let p = game.side(color).token;
            if p.within() {
                hash ^= self.tokens[p.row as usize][p.col as usize][color.index()];
            }
        }
        hash
    }

    /// Occupancy combined with tiles, waypoints, route progress, spares, the
    /// side to move and the blocked insertion.
    pub fn full(&self, game: &Game) -> u64 {
        let mut hash = self.occupancy(game);
        for (p, tile) in game.grid.iter() {
            let (r, c) = (p.row as usize, p.col as usize);
            hash ^= self.shapes[r][c][shape_index(tile.shape)];
            if let Some(w) = tile.waypoint {
                hash ^= self.waypoints[r][c][waypoint_index(w)];
            }
        }
        for color in Color::iter() {
            let side = game.side(color);
            hash ^= self.progress[color.index()][side.progress.min(4) as usize];
            if let Some(spare) = side.spare {
                hash ^= self.spares[color.index()][shape_index(spare.shape)];
            }
        }
        if let Some(p) = game.last_insertion.filter(|p| p.within()) {
            hash ^= self.last_insertion[p.row as usize][p.col as usize];
        }
        if let Some(winner) = game.winner {
            hash ^= self.winner[winner.index()];
        }
        if game.to_move == Color::Blue {
            hash ^= self.blue_to_move;
        }
        hash
    }
}
