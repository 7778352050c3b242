use std::time::Duration;

use super::WaypointHeuristic;
use crate::game::Game;
use crate::search::{
    alphabeta, alphabeta_tt, iterative_deepening, minimax, HashKey, SearchResult, SEED,
};

/// Fixed depth tree search, used by minimax and alpha-beta.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TreeAgent {
    pub depth: usize,
    pub heuristic: WaypointHeuristic,
}

impl Default for TreeAgent {
    fn default() -> Self {
        Self {
            depth: 2,
            heuristic: WaypointHeuristic::default(),
        }
    }
}

impl TreeAgent {
    pub fn minimax(&self, game: &Game) -> SearchResult {
        minimax(game, self.depth.max(1), &self.heuristic)
    }

    pub fn alphabeta(&self, game: &Game) -> SearchResult {
        alphabeta(game, self.depth.max(1), &self.heuristic)
    }
}

/// Alpha-beta with a transposition table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TranspositionAgent {
    pub depth: usize,
    pub key: HashKey,
    pub seed: u64,
    pub heuristic: WaypointHeuristic,
}

impl Default for TranspositionAgent {
    fn default() -> Self {
        Self {
            depth: 3,
            key: HashKey::default(),
            seed: SEED,
            heuristic: WaypointHeuristic::default(),
        }
    }
}

impl TranspositionAgent {
    pub fn step(&self, game: &Game) -> SearchResult {
        alphabeta_tt(
            game,
            self.depth.max(1),
            &self.heuristic,
            self.key,
            self.seed,
        )
    }
}

/// Iterative deepening alpha-beta sharing one transposition table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IterativeAgent {
    pub max_depth: usize,
    /// Stop deepening after this many milliseconds.
    pub time_limit_ms: Option<u64>,
    pub key: HashKey,
    pub seed: u64,
    pub heuristic: WaypointHeuristic,
}

impl Default for IterativeAgent {
    fn default() -> Self {
        Self {
            max_depth: 4,
            time_limit_ms: None,
            key: HashKey::default(),
            seed: SEED,
            heuristic: WaypointHeuristic::default(),
        }
    }
}

impl IterativeAgent {
    pub fn step(&self, game: &Game) -> SearchResult {
        iterative_deepening(
            game,
            self.max_depth.max(1),
            &self.heuristic,
            self.key,
            self.seed,
            self.time_limit_ms.map(Duration::from_millis),
        )
    }
}
