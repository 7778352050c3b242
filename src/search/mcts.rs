use std::time::Instant;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{Heuristic, SearchResult, SearchStats};
use crate::env::Color;
use crate::game::{Game, Move};
use crate::util::argmax;

/// Heuristic differences are squashed into (-1, 1) with this scale.
const REWARD_SCALE: f64 = 10_000.0;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone)]
pub struct Node {
    pub game: Game,
    /// Back-link used only for backpropagation.
    pub parent: Option<NodeId>,
    /// Side that played `mv`. Rewards are accumulated from its view.
    pub mover: Color,
    pub mv: Option<Move>,
    pub children: Vec<NodeId>,
    pub unexpanded: Vec<Move>,
    pub visits: u32,
    pub reward: f64,
}

impl Node {
    fn new(game: Game, parent: Option<NodeId>, mover: Color, mv: Option<Move>) -> Node {
        Node {
            unexpanded: game.moves(),
            game,
            parent,
            mover,
            mv,
            children: Vec::new(),
            visits: 0,
            reward: 0.0,
        }
    }

    pub fn mean(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward / self.visits as f64
        }
    }

    /// UCB1, unvisited nodes are tried first.
    pub fn ucb(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        self.mean() + exploration * ((parent_visits as f64).ln() / self.visits as f64).sqrt()
    }
}

/// Monte Carlo search tree with arena allocated nodes.
#[derive(Debug)]
pub struct MctsTree<'a> {
    nodes: Vec<Node>,
    heuristic: &'a dyn Heuristic,
    exploration: f64,
    rollout_depth: usize,
    rollouts: u64,
}

impl<'a> MctsTree<'a> {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(
        game: &Game,
        heuristic: &'a dyn Heuristic,
        exploration: f64,
        rollout_depth: usize,
    ) -> Self {
        Self {
            nodes: vec![Node::new(*game, None, game.to_move.other(), None)],
            heuristic,
            exploration,
            rollout_depth,
            rollouts: 0,
        }
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Child with the highest UCB1 value.
    pub fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id);
        let i = argmax(
            node.children
                .iter()
                .map(|&c| self.get(c).ucb(node.visits, self.exploration)),
        )?;
        Some(node.children[i])
    }

    /// One round of selection, expansion, simulation and backpropagation.
    pub fn simulate(&mut self, rng: &mut impl Rng) {
        let mut id = Self::ROOT;
        loop {
            let node = self.get(id);
            if !node.unexpanded.is_empty() {
                break;
            }
            match self.best_child(id) {
                Some(child) => id = child,
                None => break,
            }
        }

        let leaf = self.expand(id, rng).unwrap_or(id);
        let reward = self.rollout(leaf, rng);
        self.backpropagate(leaf, reward);
    }

    fn expand(&mut self, id: NodeId, rng: &mut impl Rng) -> Option<NodeId> {
        let node = self.get_mut(id);
        if node.unexpanded.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..node.unexpanded.len());
        let mv = node.unexpanded.swap_remove(i);
        let game = node.game;

        let child = Node::new(game.successor(mv), Some(id), game.to_move, Some(mv));
        let child = self.allocate(child);
        self.get_mut(id).children.push(child);
        Some(child)
    }

    /// Plays random moves and returns the reward for each color.
    fn rollout(&mut self, id: NodeId, rng: &mut impl Rng) -> [f64; 2] {
        let mut parent = match self.get(id).parent {
            Some(p) => self.get(p).game,
            None => self.get(id).game,
        };
        let mut game = self.get(id).game;

        for _ in 0..self.rollout_depth {
            if game.is_over() {
                break;
            }
            let moves = game.moves();
            let Some(&mv) = moves.choose(rng) else {
                break;
            };
            parent = game;
            game = game.successor(mv);
        }

        let red = match game.winner {
            Some(Color::Red) => 1.0,
            Some(Color::Blue) => -1.0,
            None => {
                self.rollouts += 1;
                let diff = self.heuristic.eval(&parent, &game, Color::Red)
                    - self.heuristic.eval(&parent, &game, Color::Blue);
                (diff / REWARD_SCALE).tanh()
            }
        };
        [red, -red]
    }

    fn backpropagate(&mut self, id: NodeId, reward: [f64; 2]) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            node.reward += reward[node.mover.index()];
            current = node.parent;
        }
    }

    /// Follows the best children from the root.
    pub fn principal_path(&self) -> Vec<Move> {
        let mut path = Vec::new();
        let mut id = Self::ROOT;
        while let Some(child) = self.best_child(id) {
            path.extend(self.get(child).mv);
            id = child;
        }
        path
    }

    fn stats(&self) -> SearchStats {
        SearchStats {
            nodes: self.nodes.len() as u64,
            evals: self.rollouts,
            ..SearchStats::default()
        }
    }
}

/// Monte Carlo tree search with a fixed number of simulations.
///
/// @see https://en.wikipedia.org/wiki/Monte_Carlo_tree_search
/// - The final move is picked with the UCB1 rule used during selection
/// - Without any simulation the first ordered move is returned
/// - The score is the mean reward of the chosen child in [-1, 1]
pub fn mcts(
    game: &Game,
    heuristic: &dyn Heuristic,
    simulations: usize,
    rollout_depth: usize,
    exploration: f64,
    rng: &mut impl Rng,
) -> SearchResult {
    let start = Instant::now();
    let mut tree = MctsTree::new(game, heuristic, exploration, rollout_depth);
    for _ in 0..simulations {
        tree.simulate(rng);
    }
    let stats = tree.stats();
    debug!(
        "mcts simulations={simulations} {stats:?} {}ms",
        start.elapsed().as_millis()
    );

    match tree.best_child(MctsTree::ROOT) {
        Some(child) => {
            let path = tree.principal_path();
            SearchResult {
                mv: tree.get(child).mv,
                score: tree.get(child).mean(),
                path,
                stats,
            }
        }
        None => {
            let mv = game.moves().first().copied();
            SearchResult {
                mv,
                score: 0.0,
                path: mv.into_iter().collect(),
                stats,
            }
        }
    }
}
