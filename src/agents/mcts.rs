use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::WaypointHeuristic;
use crate::game::Game;
use crate::search::{mcts, SearchResult};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MctsAgent {
    pub simulations: usize,
    /// Random plies per simulation before the heuristic decides.
    pub rollout_depth: usize,
    pub exploration: f64,
    /// Fixed seed for reproducible games, entropy otherwise.
    pub seed: Option<u64>,
    pub heuristic: WaypointHeuristic,
}

impl Default for MctsAgent {
    fn default() -> Self {
        Self {
            simulations: 50,
            rollout_depth: 16,
            exploration: std::f64::consts::SQRT_2,
            seed: None,
            heuristic: WaypointHeuristic::default(),
        }
    }
}

impl MctsAgent {
    pub fn step(&self, game: &Game) -> SearchResult {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        mcts(
            game,
            &self.heuristic,
            self.simulations,
            self.rollout_depth,
            self.exploration,
            &mut rng,
        )
    }
}
