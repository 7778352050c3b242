use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::game::Game;
use crate::search::SearchResult;

/// Plays a uniformly random legal move.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RandomAgent {
    pub seed: Option<u64>,
}

impl RandomAgent {
    pub fn step(&self, game: &Game) -> SearchResult {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mv = game.moves().choose(&mut rng).copied();
        SearchResult {
            mv,
            path: mv.into_iter().collect(),
            ..SearchResult::default()
        }
    }
}
