use std::time::Instant;

use log::debug;

use super::{cons, terminal_score, Heuristic, SearchResult, SearchStats};
use crate::env::Color;
use crate::game::{Game, Move};

/// Plain minimax without pruning.
///
/// Scores are always from the view of the side to move at the root, which
/// maximizes on its own turns and minimizes on the opponent's.
pub fn minimax(game: &Game, depth: usize, heuristic: &dyn Heuristic) -> SearchResult {
    let start = Instant::now();
    let mut stats = SearchStats::default();
    let (score, path) = minimax_rec(
        game,
        game,
        depth,
        true,
        game.to_move,
        heuristic,
        &mut stats,
    );
    debug!(
        "minimax depth={depth} {stats:?} {}ms",
        start.elapsed().as_millis()
    );
    SearchResult::from_path(score, path, stats)
}

fn minimax_rec(
    parent: &Game,
    game: &Game,
    depth: usize,
    maximizing: bool,
    player: Color,
    heuristic: &dyn Heuristic,
    stats: &mut SearchStats,
) -> (f64, Vec<Move>) {
    stats.nodes += 1;
    if let Some(winner) = game.winner {
        return (terminal_score(winner, player), Vec::new());
    }

    let moves = if depth > 0 { game.moves() } else { Vec::new() };
    if moves.is_empty() {
        stats.evals += 1;
        return (heuristic.eval(parent, game, player), Vec::new());
    }

    let mut best = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    let mut best_path = Vec::new();
    for mv in moves {
        let next = game.successor(mv);
        let (score, path) = minimax_rec(
            game,
            &next,
            depth - 1,
            !maximizing,
            player,
            heuristic,
            stats,
        );
        if (maximizing && score > best) || (!maximizing && score < best) {
            best = score;
            best_path = cons(mv, path);
        }
    }
    (best, best_path)
}
