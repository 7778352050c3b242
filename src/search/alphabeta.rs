use std::time::Instant;

use log::debug;

use super::{cons, terminal_score, Heuristic, SearchResult, SearchStats};
use crate::env::Color;
use crate::game::{Game, Move};

/// Alpha-Beta tree search.
///
/// @see https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning
/// - Scores are from the view of the side to move at the root
/// - Fail-soft, the root is searched with an open window so the result
///   equals the minimax value
pub fn alphabeta(game: &Game, depth: usize, heuristic: &dyn Heuristic) -> SearchResult {
    let start = Instant::now();
    let mut stats = SearchStats::default();
    let (score, path) = alphabeta_rec(
        game,
        game,
        depth,
        f64::NEG_INFINITY,
        f64::INFINITY,
        true,
        game.to_move,
        heuristic,
        &mut stats,
    );
    debug!(
        "alphabeta depth={depth} {stats:?} {}ms",
        start.elapsed().as_millis()
    );
    SearchResult::from_path(score, path, stats)
}

#[allow(clippy::too_many_arguments)]
fn alphabeta_rec(
    parent: &Game,
    game: &Game,
    depth: usize,
    mut alpha: f64,
    mut beta: f64,
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

    if maximizing {
        let mut value = (f64::NEG_INFINITY, Vec::new());
        for mv in moves {
            let next = game.successor(mv);
            let (score, path) = alphabeta_rec(
                game,
                &next,
                depth - 1,
                alpha,
                beta,
                false,
                player,
                heuristic,
                stats,
            );
            if score > value.0 {
                value = (score, cons(mv, path));
            }
            if score > alpha {
                alpha = score;
            }
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        value
    } else {
        let mut value = (f64::INFINITY, Vec::new());
        for mv in moves {
            let next = game.successor(mv);
            let (score, path) = alphabeta_rec(
                game,
                &next,
                depth - 1,
                alpha,
                beta,
                true,
                player,
                heuristic,
                stats,
            );
            if score < value.0 {
                value = (score, cons(mv, path));
            }
            if score < beta {
                beta = score;
            }
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        value
    }
}
