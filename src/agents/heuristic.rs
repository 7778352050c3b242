use crate::env::Color;
use crate::game::Game;
use crate::search::Heuristic;

/// Progress along the route minus the distance to the next goal, with
/// penalties for letting the opponent reach its own goal.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WaypointHeuristic {
    pub base: f64,
    pub waypoint_bonus: f64,
    pub missing_goal: f64,
    pub opponent_at_goal: f64,
    pub opponent_closer: f64,
}

impl Default for WaypointHeuristic {
    fn default() -> Self {
        Self {
            base: 1000.0,
            waypoint_bonus: 5000.0,
            missing_goal: 500.0,
            opponent_at_goal: 10000.0,
            opponent_closer: 50.0,
        }
    }
}

impl WaypointHeuristic {
    fn progress(&self, game: &Game, player: Color) -> f64 {
        let side = game.side(player);
        match game.goal_distance(player) {
            Some(dist) => self.waypoint_bonus * side.progress as f64 + self.base - dist as f64,
            None => -self.missing_goal,
        }
    }

    /// Penalty if the opponent can reach its goal right away or got closer
    /// to it with the last move.
    pub fn prevent_opponent_to_goal(&self, parent: &Game, game: &Game, player: Color) -> f64 {
        let opponent = player.other();
        if let Some(goal) = game.goal(opponent) {
            if game.destinations(opponent).contains(goal) {
                return -self.opponent_at_goal;
            }
        }
        match (parent.goal_distance(opponent), game.goal_distance(opponent)) {
            (Some(before), Some(after)) if after < before => -self.opponent_closer,
            _ => 0.0,
        }
    }
}

impl Heuristic for WaypointHeuristic {
    fn eval(&self, parent: &Game, game: &Game, player: Color) -> f64 {
        self.progress(game, player) + self.prevent_opponent_to_goal(parent, game, player)
    }
}

#[cfg(test)]
mod test {
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::env::Coord;
    use crate::game::{Shape, Tile};
    use crate::search::test::{sun_game, SUN};

    #[test]
    fn reaching_waypoint_pays() {
        let game = sun_game();
        let heuristic = WaypointHeuristic::default();

        let mut best = f64::NEG_INFINITY;
        let mut best_target = None;
        for mv in game.moves() {
            let next = game.successor(mv);
            let score = heuristic.eval(&game, &next, Color::Red);
            if score > best {
                best = score;
                best_target = mv.target;
            }
        }
        assert_eq!(best_target, Some(SUN));
        assert!(best >= heuristic.waypoint_bonus);
    }

    /// Blue reaches the sun only along the top row.
    const CORRIDOR: &str = r#"
        ┌s ─  ─  ─  ─  ─  ┐B
        ─  ─  ─  ─  ─  ─  ─
        ─  ─  ─  ─  ─  ─  ─
        ─  ─  ─  ─R ─  ─  ─
        ─  ─  ─  ─  ─  ─  ─
        ─  ─  ─  ─  ─  ─  ─
        ─  ─  ─  ─  ─  ─  ─
    "#;

    #[test]
    fn opponent_at_goal_penalty() {
        let game = Game::parse(CORRIDOR).unwrap();
        let heuristic = WaypointHeuristic::default();
        assert!(game.destinations(Color::Blue).contains(Coord::new(0, 0)));

        // only pushing the vertical spare into the top row cuts blue off
        let blocking = [Coord::new(0, 1), Coord::new(0, 3), Coord::new(0, 5)];
        let moves = game.moves();
        assert_eq!(
            moves.iter().map(|mv| mv.insert).collect::<FxHashSet<_>>().len(),
            12
        );
        for mv in moves {
            let next = game.successor(mv);
            let prevent = heuristic.prevent_opponent_to_goal(&game, &next, Color::Red);
            if blocking.contains(&mv.insert) {
                assert_eq!(prevent, 0.0, "{mv:?}");
            } else {
                assert_eq!(prevent, -heuristic.opponent_at_goal, "{mv:?}");
            }
        }
    }

    #[test]
    fn opponent_closer_penalty() {
        let mut parent = Game::parse(CORRIDOR).unwrap();
        parent.grid[Coord::new(0, 3)] = Tile::new(Shape::Vertical);
        let heuristic = WaypointHeuristic::default();
        assert!(!parent.destinations(Color::Blue).contains(Coord::new(0, 0)));

        let mut closer = parent;
        closer.sides[Color::Blue.index()].token = Coord::new(0, 5);
        assert_eq!(
            heuristic.prevent_opponent_to_goal(&parent, &closer, Color::Red),
            -heuristic.opponent_closer
        );
        assert_eq!(
            heuristic.prevent_opponent_to_goal(&parent, &parent, Color::Red),
            0.0
        );
        let mut farther = parent;
        farther.sides[Color::Blue.index()].token = Coord::new(1, 6);
        assert_eq!(
            heuristic.prevent_opponent_to_goal(&parent, &farther, Color::Red),
            0.0
        );
    }

    #[test]
    fn missing_goal() {
        let mut game = sun_game();
        game.grid[SUN].waypoint = None;
        let heuristic = WaypointHeuristic::default();
        assert_eq!(game.goal(Color::Red), None);
        assert_eq!(
            heuristic.eval(&game, &game, Color::Red),
            -heuristic.missing_goal
        );
    }

    #[test]
    fn partial_config() {
        let heuristic: WaypointHeuristic =
            serde_json::from_str(r#"{"waypoint_bonus": 100.0}"#).unwrap();
        assert_eq!(heuristic.waypoint_bonus, 100.0);
        assert_eq!(heuristic.base, WaypointHeuristic::default().base);
    }
}
