use std::time::{Duration, Instant};

use log::{debug, warn};
use rustc_hash::FxHashMap;

use super::{
    cons, terminal_score, HashKey, Heuristic, SearchResult, SearchStats, Zobrist, WIN,
};
use crate::env::Color;
use crate::game::{Game, Move};

/// Deadline checks are done every this many nodes.
const CLOCK_INTERVAL: u64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TTFlag {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    pub flag: TTFlag,
    pub depth: u8,
    pub score: f64,
    pub mv: Option<Move>,
}

/// Position cache owned by a single search invocation.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    table: FxHashMap<u64, TTEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash: u64) -> Option<&TTEntry> {
        self.table.get(&hash)
    }

    /// Keeps the deeper entry if the position is already stored.
    pub fn insert(&mut self, hash: u64, entry: TTEntry) {
        match self.table.get(&hash) {
            Some(old) if old.depth > entry.depth => {}
            _ => {
                self.table.insert(hash, entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn tt_flag(score: f64, alpha0: f64, beta: f64) -> TTFlag {
    if score <= alpha0 {
        TTFlag::Upper
    } else if score >= beta {
        TTFlag::Lower
    } else {
        TTFlag::Exact
    }
}

/// Alpha-beta with a transposition table, reused across the iterations of
/// iterative deepening.
#[derive(Debug)]
pub struct TranspositionSearch<'a> {
    heuristic: &'a dyn Heuristic,
    zobrist: Zobrist,
    key: HashKey,
    table: TranspositionTable,
    deadline: Option<Instant>,
    player: Color,
    stats: SearchStats,
    aborted: bool,
}

impl<'a> TranspositionSearch<'a> {
    pub fn new(heuristic: &'a dyn Heuristic, key: HashKey, seed: u64) -> Self {
        Self {
            heuristic,
            zobrist: Zobrist::new(seed),
            key,
            table: TranspositionTable::new(),
            deadline: None,
            player: Color::Red,
            stats: SearchStats::default(),
            aborted: false,
        }
    }

    /// Stops the search once `limit` has elapsed.
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.deadline = limit.map(|l| Instant::now() + l);
        self
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    fn should_terminate(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Searches `game` to a fixed depth.
    /// Returns `None` if the deadline passed before the search completed.
    pub fn search(&mut self, game: &Game, depth: usize) -> Option<SearchResult> {
        let start = Instant::now();
        self.player = game.to_move;
        self.stats = SearchStats::default();
        self.aborted = false;

        let depth = depth.min(u8::MAX as usize) as u8;
        let (score, path) = self.alphabeta(game, game, depth, 0, f64::NEG_INFINITY, f64::INFINITY);
        debug!(
            "tt depth={depth} {:?} entries={} {}ms",
            self.stats,
            self.table.len(),
            start.elapsed().as_millis()
        );
        if self.aborted {
            None
        } else {
            Some(SearchResult::from_path(score, path, self.stats))
        }
    }

    /// Searches depth 1, 2, ... up to `max_depth` and returns the result of
    /// the deepest completed iteration.
    ///
    /// Stops early on a decided game or when the deadline passed. If not even
    /// the first iteration completes, the first ordered move is returned.
    pub fn iterative(&mut self, game: &Game, max_depth: usize) -> SearchResult {
        let mut total = SearchStats::default();
        let mut best: Option<SearchResult> = None;

        for depth in 1..=max_depth.max(1) {
            if self.should_terminate() {
                debug!("tt deadline reached before depth={depth}");
                break;
            }
            let Some(result) = self.search(game, depth) else {
                warn!("tt depth={depth} timed out");
                total.add(&self.stats);
                break;
            };
            total.add(&result.stats);
            let decided = result.score.abs() >= WIN;
            best = Some(result);
            if decided {
                break;
            }
        }

        let mut result = best.unwrap_or_else(|| fallback(game, self.heuristic));
        result.stats = total;
        result
    }

    fn alphabeta(
        &mut self,
        parent: &Game,
        game: &Game,
        depth: u8,
        ply: usize,
        mut alpha: f64,
        mut beta: f64,
    ) -> (f64, Vec<Move>) {
        self.stats.nodes += 1;
        if self.aborted
            || (self.stats.nodes % CLOCK_INTERVAL == 0 && self.should_terminate())
        {
            self.aborted = true;
            return (0.0, Vec::new());
        }

        if let Some(winner) = game.winner {
            return (terminal_score(winner, self.player), Vec::new());
        }

        let mut moves = if depth > 0 { game.moves() } else { Vec::new() };
        if moves.is_empty() {
            self.stats.evals += 1;
            return (self.heuristic.eval(parent, game, self.player), Vec::new());
        }

        let hash = self.zobrist.hash(game, self.key);
        let mut tt_move = None;
        if let Some(entry) = self.table.get(hash).copied() {
            tt_move = entry.mv;
            if ply > 0 && entry.depth >= depth {
                self.stats.tt_hits += 1;
                match entry.flag {
                    TTFlag::Exact => return (entry.score, entry.mv.into_iter().collect()),
                    TTFlag::Lower => alpha = alpha.max(entry.score),
                    TTFlag::Upper => beta = beta.min(entry.score),
                }
                if beta <= alpha {
                    return (entry.score, entry.mv.into_iter().collect());
                }
            }
        }

        // Best move of the previous iteration first
        if let Some(mv) = tt_move {
            if let Some(i) = moves.iter().position(|&m| m == mv) {
                moves[..=i].rotate_right(1);
            }
        }

        let (alpha0, beta0) = (alpha, beta);
        let maximizing = game.to_move == self.player;
        let mut value = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut best_path = Vec::new();

        for mv in moves {
            let next = game.successor(mv);
            let (score, path) = self.alphabeta(game, &next, depth - 1, ply + 1, alpha, beta);
            if self.aborted {
                return (0.0, Vec::new());
            }

            if maximizing {
                if score > value {
                    value = score;
                    best_path = cons(mv, path);
                }
                alpha = alpha.max(score);
            } else {
                if score < value {
                    value = score;
                    best_path = cons(mv, path);
                }
                beta = beta.min(score);
            }
            if beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }

        self.table.insert(
            hash,
            TTEntry {
                flag: tt_flag(value, alpha0, beta0),
                depth,
                score: value,
                mv: best_path.first().copied(),
            },
        );
        (value, best_path)
    }
}

/// First move in generator order, scored by the heuristic.
fn fallback(game: &Game, heuristic: &dyn Heuristic) -> SearchResult {
    match game.moves().first() {
        Some(&mv) => {
            let next = game.successor(mv);
            SearchResult {
                mv: Some(mv),
                score: heuristic.eval(game, &next, game.to_move),
                path: vec![mv],
                stats: SearchStats::default(),
            }
        }
        None => SearchResult {
            score: heuristic.eval(game, game, game.to_move),
            ..SearchResult::default()
        },
    }
}

/// Alpha-beta with a fresh transposition table.
pub fn alphabeta_tt(
    game: &Game,
    depth: usize,
    heuristic: &dyn Heuristic,
    key: HashKey,
    seed: u64,
) -> SearchResult {
    TranspositionSearch::new(heuristic, key, seed)
        .search(game, depth)
        .unwrap_or_else(|| fallback(game, heuristic))
}

/// Iterative deepening up to `max_depth` with an optional time limit.
pub fn iterative_deepening(
    game: &Game,
    max_depth: usize,
    heuristic: &dyn Heuristic,
    key: HashKey,
    seed: u64,
    time_limit: Option<Duration>,
) -> SearchResult {
    TranspositionSearch::new(heuristic, key, seed)
        .with_time_limit(time_limit)
        .iterative(game, max_depth)
}
