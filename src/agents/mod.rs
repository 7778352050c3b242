use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::info;

mod heuristic;
pub use heuristic::*;
mod mcts;
pub use mcts::*;
mod random;
pub use random::*;
mod tree;
pub use tree::*;

use crate::game::{Game, Move};
use crate::search::{SearchError, SearchResult};

/// Search strategy and its configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Agent {
    Minimax(TreeAgent),
    AlphaBeta(TreeAgent),
    Transposition(TranspositionAgent),
    IterativeDeepening(IterativeAgent),
    Mcts(MctsAgent),
    Random(RandomAgent),
}

impl Default for Agent {
    fn default() -> Self {
        Self::AlphaBeta(TreeAgent::default())
    }
}

impl Agent {
    /// Searches the best move for the side to move.
    pub fn step(&self, game: &Game) -> Result<SearchResult, SearchError> {
        if game.is_over() {
            return Err(SearchError::GameOver);
        }
        if !game.awaits_insertion() {
            return Err(SearchError::NoSpareTile(game.to_move));
        }

        let start = Instant::now();
        let result = match self {
            Agent::Minimax(agent) => agent.minimax(game),
            Agent::AlphaBeta(agent) => agent.alphabeta(game),
            Agent::Transposition(agent) => agent.step(game),
            Agent::IterativeDeepening(agent) => agent.step(game),
            Agent::Mcts(agent) => agent.step(game),
            Agent::Random(agent) => agent.step(game),
        };
        info!(
            "{:?} {:?} score={} {}ms",
            game.to_move,
            result.mv,
            result.score,
            start.elapsed().as_millis()
        );
        Ok(result)
    }
}

/// Chooses the move for the side to move.
/// `None` if it has no legal move, an error if the game is already over or
/// the mover has no spare tile to insert.
pub fn choose_move(game: &Game, agent: &Agent) -> Result<Option<Move>, SearchError> {
    agent.step(game).map(|result| result.mv)
}

impl FromStr for Agent {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
