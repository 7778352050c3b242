mod minimax;
pub use minimax::*;
mod alphabeta;
pub use alphabeta::*;
mod zobrist;
pub use zobrist::*;
mod transposition;
pub use transposition::*;
mod mcts;
pub use mcts::*;

use std::fmt::Debug;

use thiserror::Error;

use crate::env::Color;
use crate::game::{Game, Move};

pub const WIN: f64 = 1_000_000.0;
pub const DRAW: f64 = 0.0;
pub const LOSS: f64 = -1_000_000.0;

/// A heuristic that evaluates the game state at the leafs of a tree search.
pub trait Heuristic: Debug + Send + Sync {
    /// Scores `game` from the view of `player`.
    /// `parent` is the state before the last move.
    fn eval(&self, parent: &Game, game: &Game, player: Color) -> f64;
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("the game is already over")]
    GameOver,
    #[error("{0:?} holds no spare tile")]
    NoSpareTile(Color),
}

/// Counters collected during a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub evals: u64,
    pub cutoffs: u64,
    pub tt_hits: u64,
}

impl SearchStats {
    pub fn add(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.evals += other.evals;
        self.cutoffs += other.cutoffs;
        self.tt_hits += other.tt_hits;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    /// `None` if the side to move has no legal move.
    pub mv: Option<Move>,
    pub score: f64,
    /// Principal variation starting with `mv`.
    pub path: Vec<Move>,
    pub stats: SearchStats,
}

impl SearchResult {
    fn from_path(score: f64, path: Vec<Move>, stats: SearchStats) -> SearchResult {
        SearchResult {
            mv: path.first().copied(),
            score,
            path,
            stats,
        }
    }
}

/// Score of a finished game for `player`.
fn terminal_score(winner: Color, player: Color) -> f64 {
    if winner == player {
        WIN
    } else {
        LOSS
    }
}

/// Prepends `mv` to the variation of a child node.
fn cons(mv: Move, mut path: Vec<Move>) -> Vec<Move> {
    path.insert(0, mv);
    path
}
