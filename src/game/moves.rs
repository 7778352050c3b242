use serde::{Deserialize, Serialize};

use super::Game;
use crate::env::Coord;

/// A full turn: where the spare tile is inserted and where the token goes.
/// `target` is `None` only if the token has nowhere to go after the insertion.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub insert: Coord,
    #[serde(default)]
    pub target: Option<Coord>,
}

impl Move {
    pub const fn new(insert: Coord, target: Option<Coord>) -> Move {
        Move { insert, target }
    }
}

/// Border cells that are not fixed in place.
pub const INSERTIONS: [Coord; 12] = [
    Coord::new(0, 1),
    Coord::new(0, 3),
    Coord::new(0, 5),
    Coord::new(1, 6),
    Coord::new(3, 6),
    Coord::new(5, 6),
    Coord::new(6, 5),
    Coord::new(6, 3),
    Coord::new(6, 1),
    Coord::new(5, 0),
    Coord::new(3, 0),
    Coord::new(1, 0),
];

impl Game {
    /// Insertion cells available to the side to move.
    pub fn insertions(&self) -> impl Iterator<Item = Coord> + '_ {
        INSERTIONS.iter().copied().filter(|&p| self.can_insert(p))
    }

    /// Generates all legal moves for the side to move.
    ///
    /// Moves are ordered by the distance of the resulting token position to
    /// the mover's goal, closest first.
    pub fn moves(&self) -> Vec<Move> {
        if self.is_over() || !self.awaits_insertion() {
            return Vec::new();
        }
        let mover = self.to_move;

        let mut moves = Vec::with_capacity(64);
        let mut keys = Vec::with_capacity(64);
        for insert in self.insertions() {
            let Ok(next) = self.insert_tile(insert) else {
                continue;
            };
            let goal = next.goal(mover);
            let dist = |p: Coord| goal.map_or(0, |g| p.manhattan(g));

            let destinations = next.destinations(mover);
            if destinations.is_empty() {
                moves.push(Move::new(insert, None));
                keys.push(dist(next.side(mover).token));
            } else {
                for target in destinations.iter() {
                    moves.push(Move::new(insert, Some(target)));
                    keys.push(dist(target));
                }
            }
        }

        let mut order: Vec<usize> = (0..moves.len()).collect();
        order.sort_by_key(|&i| keys[i]);
        order.into_iter().map(|i| moves[i]).collect()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::env::Color;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    /// Random game after a number of random legal turns.
    pub fn played(seed: u64, plies: usize) -> Game {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut game = Game::random(&mut rng);
        for _ in 0..plies {
            match game.moves().choose(&mut rng) {
                Some(&mv) => game = game.apply(mv).unwrap(),
                None => break,
            }
        }
        game
    }

    #[test]
    fn insertion_cells() {
        let game = Game::with_seed(1);
        for p in INSERTIONS {
            assert!(p.push_direction().is_some());
            assert!(game.can_insert(p), "{p:?}");
        }
        let all: Vec<Coord> = (0..49)
            .map(Coord::from_index)
            .filter(|&p| game.can_insert(p))
            .collect();
        assert_eq!(all.len(), INSERTIONS.len());
    }

    #[test]
    fn no_immediate_reversal() {
        let game = Game::with_seed(3);
        let mv = game
            .moves()
            .into_iter()
            .find(|m| m.insert == Coord::new(3, 0))
            .unwrap();
        let next = game.apply(mv).unwrap();
        assert_eq!(next.to_move, Color::Blue);
        assert!(next.insertions().all(|p| p != Coord::new(3, 6)));
        assert!(next.moves().iter().all(|m| m.insert != Coord::new(3, 6)));
    }

    #[test]
    fn moves_sorted_by_goal_distance() {
        let game = played(7, 4);
        let mover = game.to_move;
        let dists: Vec<u32> = game
            .moves()
            .iter()
            .map(|&mv| {
                let next = game.insert_tile(mv.insert).unwrap();
                let goal = next.goal(mover).unwrap();
                mv.target.unwrap_or(next.side(mover).token).manhattan(goal)
            })
            .collect();
        assert!(!dists.is_empty());
        assert!(dists.windows(2).all(|w| w[0] <= w[1]), "{dists:?}");
    }

    #[test]
    fn moves_when_blocked() {
        // red is walled in on a vertical stub
        let game = Game::parse(
            r#"
            ┌s ─  ┬  ─  ┬  ─  ┐B
            ─  ─  ─  ┬m ─  ─  ─
            ├  ─  ─  │  ─  ─  ┤
            ─  ─  ─  │  ─  ─  ─
            ├  ─  ─  │  ─  ─  ┤
            ─  ─  ─  ┴o ─  ─  ─
            ┘R ─  ┴  ─  ┴  ─  ┘g
            "#,
        )
        .unwrap();
        let moves = game.moves();
        assert!(!moves.is_empty());
        for mv in &moves {
            let next = game.insert_tile(mv.insert).unwrap();
            if mv.target.is_none() {
                assert!(next.destinations(Color::Red).is_empty());
                assert!(next.pass_token().is_ok());
            }
        }
        // inserting far from red keeps it stuck
        assert!(moves.contains(&Move::new(Coord::new(0, 3), None)));
    }

    #[test]
    fn no_moves_for_finished_game() {
        let mut game = Game::with_seed(5);
        game.winner = Some(Color::Blue);
        assert!(game.moves().is_empty());
    }

    #[test]
    fn move_json() {
        let mv = Move::new(Coord::new(3, 0), Some(Coord::new(2, 2)));
        let json = serde_json::to_string(&mv).unwrap();
        assert_eq!(
            json,
            r#"{"insert":{"row":3,"col":0},"target":{"row":2,"col":2}}"#
        );
        let pass: Move = serde_json::from_str(r#"{"insert":{"row":1,"col":0}}"#).unwrap();
        assert_eq!(pass, Move::new(Coord::new(1, 0), None));
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn generated_moves_are_legal(seed in any::<u64>(), plies in 0usize..12) {
            let game = played(seed, plies);
            let mover = game.to_move;
            for mv in game.moves() {
                prop_assert!(INSERTIONS.contains(&mv.insert));
                prop_assert!(game.can_insert(mv.insert));
                let next = game.insert_tile(mv.insert).unwrap();
                let reachable = next.destinations(mover);
                match mv.target {
                    Some(t) => prop_assert!(reachable.contains(t)),
                    None => prop_assert!(reachable.is_empty()),
                }
                prop_assert_eq!(game.apply(mv), Ok(game.successor(mv)));
            }
        }
    }
}
