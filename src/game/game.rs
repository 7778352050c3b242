use std::fmt::{self, Debug};

use owo_colors::{OwoColorize, Style};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Grid, Move, Shape, Tile, Waypoint, SIZE};
use crate::env::{Color, Coord};
use crate::floodfill::{reachable_from, Reachable};

/// The outcome of a game.
/// If the game did not end the outcome is `None`.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Outcome {
    None,
    Winner(Color),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("no tile can be inserted at {0:?}")]
    InvalidPlacement(Coord),
    #[error("{0:?} is not reachable")]
    InvalidMove(Coord),
    #[error("cannot pass while a destination is reachable")]
    InvalidPass,
    #[error("{0:?} holds no spare tile")]
    NoSpareTile(Color),
    #[error("the spare tile has to be inserted first")]
    MissingInsertion,
    #[error("the game is over")]
    GameOver,
}

/// Inconsistent game snapshot.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("{0:?} lies outside of the board")]
    OffBoard(Coord),
    #[error("no tile can be inserted at {0:?}")]
    InvalidInsertion(Coord),
    #[error("route progress {0} exceeds the four waypoints")]
    Progress(u8),
}

/// State of one player.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Side {
    pub token: Coord,
    pub home: Coord,
    /// Only the side that still has to insert holds the spare tile.
    pub spare: Option<Tile>,
    /// Private order in which the waypoints have to be visited.
    pub route: [Waypoint; 4],
    /// Index into `route`, `RETURNING` once every waypoint was visited.
    pub progress: u8,
}

impl Side {
    pub const RETURNING: u8 = 4;

    pub fn new(home: Coord, route: [Waypoint; 4]) -> Side {
        Side {
            token: home,
            home,
            spare: None,
            route,
            progress: 0,
        }
    }

    /// The waypoint to visit next, `None` if returning home.
    pub fn target(&self) -> Option<Waypoint> {
        self.route.get(self.progress as usize).copied()
    }

    pub fn returning(&self) -> bool {
        self.progress >= Side::RETURNING
    }
}

/// Game holds the complete game state.
/// Transitions return a new state and never modify `self`.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "GameData")]
pub struct Game {
    pub grid: Grid,
    pub sides: [Side; 2],
    pub to_move: Color,
    pub winner: Option<Color>,
    /// Its mirror cell may not be used for the next insertion.
    pub last_insertion: Option<Coord>,
}

/// Unchecked wire form of `Game`.
#[derive(Deserialize)]
struct GameData {
    grid: Grid,
    sides: [Side; 2],
    to_move: Color,
    #[serde(default)]
    winner: Option<Color>,
    #[serde(default)]
    last_insertion: Option<Coord>,
}

impl TryFrom<GameData> for Game {
    type Error = GameError;

    fn try_from(data: GameData) -> Result<Self, Self::Error> {
        let game = Game {
            grid: data.grid,
            sides: data.sides,
            to_move: data.to_move,
            winner: data.winner,
            last_insertion: data.last_insertion,
        };
        game.validate()?;
        Ok(game)
    }
}

impl Game {
    /// Checks that every position lies on the board and the route cursors
    /// are in range.
    pub fn validate(&self) -> Result<(), GameError> {
        for side in &self.sides {
            for p in [side.token, side.home] {
                if !p.within() {
                    return Err(GameError::OffBoard(p));
                }
            }
            if side.progress > Side::RETURNING {
                return Err(GameError::Progress(side.progress));
            }
        }
        if let Some(p) = self.last_insertion {
            if !p.within() {
                return Err(GameError::OffBoard(p));
            }
            if p.push_direction().is_none() {
                return Err(GameError::InvalidInsertion(p));
            }
        }
        Ok(())
    }

    pub fn side(&self, color: Color) -> &Side {
        &self.sides[color.index()]
    }

    fn side_mut(&mut self, color: Color) -> &mut Side {
        &mut self.sides[color.index()]
    }

    pub fn outcome(&self) -> Outcome {
        match self.winner {
            Some(color) => Outcome::Winner(color),
            None => Outcome::None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether the side to move still has to insert its spare tile.
    pub fn awaits_insertion(&self) -> bool {
        self.side(self.to_move).spare.is_some()
    }

    /// Cell the side has to reach next: the current target waypoint or, when
    /// returning, its home. `None` if the waypoint is not on the board.
    pub fn goal(&self, color: Color) -> Option<Coord> {
        let side = self.side(color);
        match side.target() {
            Some(waypoint) => self.grid.find(waypoint),
            None => Some(side.home),
        }
    }

    /// Manhattan distance of the token to its goal.
    pub fn goal_distance(&self, color: Color) -> Option<u32> {
        self.goal(color).map(|g| self.side(color).token.manhattan(g))
    }

    /// Cells the token of `color` can move to: every connected cell except
    /// the start and the cell of the opposing token.
    pub fn destinations(&self, color: Color) -> Reachable {
        let mut cells = reachable_from(&self.grid, self.side(color).token);
        cells.remove(self.side(color.other()).token);
        cells
    }

    /// Returns if a tile can be inserted at the border cell `at`.
    ///
    /// Only every second cell of each edge is movable. The cell opposite of
    /// the previous insertion is blocked, as is every cell whose opposite end
    /// carries a token or a waypoint.
    pub fn can_insert(&self, at: Coord) -> bool {
        let Some(d) = at.push_direction() else {
            return false;
        };
        let along = if d.delta().0 == 0 { at.row } else { at.col };
        if along % 2 == 0 {
            return false;
        }
        let end = at.mirror();
        Some(end) != self.last_insertion
            && self.grid[end].waypoint.is_none()
            && self.sides.iter().all(|s| s.token != end)
    }

    /// Inserts the mover's spare tile at `at`.
    ///
    /// The tile pushed out on the other end becomes the opponent's spare.
    /// Tokens on the shifted line move with their tiles, wrapping around.
    pub fn insert_tile(&self, at: Coord) -> Result<Game, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.side(self.to_move).spare.is_none() {
            return Err(MoveError::NoSpareTile(self.to_move));
        }
        if !self.can_insert(at) {
            return Err(MoveError::InvalidPlacement(at));
        }
        let mut next = *self;
        if !next.shift(at) {
            return Err(MoveError::InvalidPlacement(at));
        }
        Ok(next)
    }

    /// Moves the mover's token to `to` and passes the turn.
    pub fn place_token(&self, to: Coord) -> Result<Game, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.awaits_insertion() {
            return Err(MoveError::MissingInsertion);
        }
        if !to.within() || !self.destinations(self.to_move).contains(to) {
            return Err(MoveError::InvalidMove(to));
        }
        let mut next = *self;
        next.place(Some(to));
        Ok(next)
    }

    /// Ends the turn without moving. Only allowed if no cell is reachable.
    pub fn pass_token(&self) -> Result<Game, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.awaits_insertion() {
            return Err(MoveError::MissingInsertion);
        }
        if !self.destinations(self.to_move).is_empty() {
            return Err(MoveError::InvalidPass);
        }
        let mut next = *self;
        next.place(None);
        Ok(next)
    }

    /// Applies a full turn with validation.
    pub fn apply(&self, mv: Move) -> Result<Game, MoveError> {
        let inserted = self.insert_tile(mv.insert)?;
        match mv.target {
            Some(to) => inserted.place_token(to),
            None => inserted.pass_token(),
        }
    }

    /// Applies a move produced by `moves` without validation.
    pub fn successor(&self, mv: Move) -> Game {
        debug_assert!(!self.is_over());
        debug_assert!(self.can_insert(mv.insert), "{mv:?}");
        let mut next = *self;
        let shifted = next.shift(mv.insert);
        debug_assert!(shifted);
        debug_assert!(mv
            .target
            .map_or(next.destinations(next.to_move).is_empty(), |t| next
                .destinations(next.to_move)
                .contains(t)));
        next.place(mv.target);
        next
    }

    fn shift(&mut self, at: Coord) -> bool {
        let mover = self.to_move;
        let Some(d) = at.push_direction() else {
            return false;
        };
        let Some(spare) = self.side_mut(mover).spare.take() else {
            return false;
        };
        let Some(ejected) = self.grid.shift(at, spare) else {
            return false;
        };
        self.side_mut(mover.other()).spare = Some(ejected);

        let horizontal = d.delta().0 == 0;
        for side in &mut self.sides {
            let on_line = if horizontal {
                side.token.row == at.row
            } else {
                side.token.col == at.col
            };
            if on_line {
                side.token = side.token.apply(d).wrap();
            }
        }
        self.last_insertion = Some(at);
        true
    }

    fn place(&mut self, to: Option<Coord>) {
        let mover = self.to_move;
        if let Some(to) = to {
            let waypoint = self.grid[to].waypoint;
            let side = self.side_mut(mover);
            side.token = to;
            if side.target().is_some() && side.target() == waypoint {
                side.progress += 1;
            } else if side.returning() && to == side.home {
                self.winner = Some(mover);
            }
        }
        self.to_move = mover.other();
    }
}

impl Game {
    /// Sets up a new game like the physical board: random free tiles, fixed
    /// corners and T-junctions, shuffled mountain and moon, private routes.
    pub fn random(rng: &mut impl Rng) -> Game {
        fn random_tile(rng: &mut impl Rng) -> Tile {
            Tile::new(Shape::ALL[rng.gen_range(0..Shape::ALL.len())])
        }

        let mut grid = Grid::default();
        for i in 0..SIZE * SIZE {
            grid[Coord::from_index(i)] = random_tile(rng);
        }

        use Shape::*;
        let fixed: [((i8, i8), Tile); 12] = [
            ((0, 0), Tile::with_waypoint(CornerDownRight, Waypoint::Sun)),
            ((0, 6), Tile::new(CornerDownLeft)),
            ((6, 0), Tile::new(CornerUpRight)),
            ((6, 6), Tile::with_waypoint(CornerUpLeft, Waypoint::Galaxy)),
            ((0, 2), Tile::new(TeeDown)),
            ((0, 4), Tile::new(TeeDown)),
            ((2, 0), Tile::new(TeeRight)),
            ((4, 0), Tile::new(TeeRight)),
            ((6, 2), Tile::new(TeeUp)),
            ((6, 4), Tile::new(TeeUp)),
            ((2, 6), Tile::new(TeeLeft)),
            ((4, 6), Tile::new(TeeLeft)),
        ];
        for (p, tile) in fixed {
            grid[Coord::from(p)] = tile;
        }

        let mut free = [Waypoint::Mountain, Waypoint::Moon];
        free.shuffle(rng);
        for (p, waypoint) in [(1i8, 3i8), (5, 3)].into_iter().zip(free) {
            grid[Coord::from(p)] = Tile {
                waypoint: Some(waypoint),
                ..random_tile(rng)
            };
        }

        let mut route = || {
            let mut route = Waypoint::ALL;
            route.shuffle(rng);
            route
        };
        let mut red = Side::new(Coord::new(6, 0), route());
        let blue = Side::new(Coord::new(0, 6), route());
        red.spare = Some(random_tile(rng));

        Game {
            grid,
            sides: [red, blue],
            to_move: Color::Red,
            winner: None,
            last_insertion: None,
        }
    }

    pub fn with_seed(seed: u64) -> Game {
        Game::random(&mut SmallRng::seed_from_u64(seed))
    }

    /// Parses the textual board representation used in tests.
    ///
    /// Seven rows of seven whitespace separated cells. Each cell is a
    /// connector glyph followed by optional markers: `s`, `o`, `g`, `m` for
    /// sun, moon, galaxy and mountain, `R` and `B` for the tokens.
    /// Homes are the starting corners, routes are sun, moon, galaxy,
    /// mountain and Red moves first holding a vertical spare.
    pub fn parse(txt: &str) -> Option<Game> {
        let mut grid = Grid::default();
        let mut red = Side::new(
            Coord::new(6, 0),
            [Waypoint::Sun, Waypoint::Moon, Waypoint::Galaxy, Waypoint::Mountain],
        );
        let mut blue = Side::new(Coord::new(0, 6), red.route);

        let lines: Vec<&str> = txt.trim().lines().collect();
        if lines.len() != SIZE {
            return None;
        }
        for (r, line) in lines.iter().enumerate() {
            let cells: Vec<&str> = line.split_whitespace().collect();
            if cells.len() != SIZE {
                return None;
            }
            for (c, cell) in cells.iter().enumerate() {
                let p = Coord::new(r as i8, c as i8);
                let mut chars = cell.chars();
                let shape = Shape::from_glyph(chars.next()?)?;
                grid[p] = Tile::new(shape);
                for marker in chars {
                    match marker {
                        'R' => red.token = p,
                        'B' => blue.token = p,
                        _ => grid[p].waypoint = Some(Waypoint::from_symbol(marker)?),
                    }
                }
            }
        }
        red.spare = Some(Tile::new(Shape::Vertical));

        Some(Game {
            grid,
            sides: [red, blue],
            to_move: Color::Red,
            winner: None,
            last_insertion: None,
        })
    }
}

impl Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn color_style(color: Color) -> Style {
            match color {
                Color::Red => Style::new().bright_red().bold(),
                Color::Blue => Style::new().bright_blue().bold(),
            }
        }

        writeln!(f, "Game {{")?;
        for r in 0..SIZE as i8 {
            write!(f, "  ")?;
            for c in 0..SIZE as i8 {
                let p = Coord::new(r, c);
                let tile = self.grid[p];
                let owner = Color::iter().find(|&color| self.side(color).token == p);
                match owner {
                    Some(color) => write!(f, "{}", tile.shape.glyph().style(color_style(color)))?,
                    None => write!(f, "{}", tile.shape.glyph())?,
                }
                match tile.waypoint {
                    Some(w) => write!(f, "{} ", w.symbol().yellow())?,
                    None => write!(f, "  ")?,
                }
            }
            writeln!(f)?;
        }
        for color in Color::iter() {
            let side = self.side(color);
            write!(f, "  {:?}: {:?} ", color.style(color_style(color)), side.token)?;
            match side.target() {
                Some(w) => write!(f, "-> {w:?} ({}/4)", side.progress)?,
                None => write!(f, "-> home {:?}", side.home)?,
            }
            if let Some(spare) = side.spare {
                write!(f, " spare {}", spare.shape.glyph())?;
            }
            if color == self.to_move {
                write!(f, " *")?;
            }
            writeln!(f)?;
        }
        if let Some(winner) = self.winner {
            writeln!(f, "  Winner: {winner:?}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const BOARD: &str = r#"
        ┌s ─  ┬  ─  ┬  ─  ┐B
        │  ─  ─  ┬m ─  ─  │
        ├  ─  ─  │  ─  ─  ┤
        │  ─  ─  │  ─  ─  │
        ├  ─  ─  │  ─  ─  ┤
        │  ─  ─  ┴o ─  ─  │
        └R ─  ┴  ─  ┴  ─  ┘g
    "#;

    #[test]
    fn game_parse() {
        let game = Game::parse(BOARD).unwrap();
        println!("{game:?}");
        assert_eq!(game.side(Color::Red).token, Coord::new(6, 0));
        assert_eq!(game.side(Color::Blue).token, Coord::new(0, 6));
        assert_eq!(game.grid[Coord::new(0, 0)].waypoint, Some(Waypoint::Sun));
        assert_eq!(game.grid[Coord::new(5, 3)].shape, Shape::TeeUp);
        assert_eq!(game.goal(Color::Red), Some(Coord::new(0, 0)));
        assert!(game.awaits_insertion());
        assert!(Game::parse("┌ ─").is_none());
    }

    #[test]
    fn insert_moves_tokens_and_spares() {
        let game = Game::parse(BOARD).unwrap();
        let before = game;

        // column 1 pushed up, nothing on it
        let next = game.insert_tile(Coord::new(6, 1)).unwrap();
        assert_eq!(game, before);
        assert_eq!(next.side(Color::Red).spare, None);
        assert_eq!(next.side(Color::Blue).spare, Some(game.grid[Coord::new(0, 1)]));
        assert_eq!(next.grid[Coord::new(6, 1)], Tile::new(Shape::Vertical));
        assert_eq!(next.last_insertion, Some(Coord::new(6, 1)));

        // rows 0 and 6 are not movable, use a board with tokens in the middle
        let mut game = game;
        game.sides[0].token = Coord::new(3, 6);
        game.sides[1].token = Coord::new(3, 2);
        let next = game.insert_tile(Coord::new(3, 0));
        // mirror cell (3, 6) carries the red token
        assert_eq!(next, Err(MoveError::InvalidPlacement(Coord::new(3, 0))));

        let next = game.insert_tile(Coord::new(3, 6)).unwrap();
        println!("{next:?}");
        assert_eq!(next.side(Color::Red).token, Coord::new(3, 5));
        assert_eq!(next.side(Color::Blue).token, Coord::new(3, 1));
    }

    #[test]
    fn insert_moves_column_tokens() {
        let mut game = Game::parse(BOARD).unwrap();
        game.sides[1].token = Coord::new(2, 3);
        game.sides[0].token = Coord::new(6, 3);
        // (6, 3) carries red, so pushing down from (0, 3) is blocked
        assert!(!game.can_insert(Coord::new(0, 3)));
        game.sides[0].token = Coord::new(4, 5);

        let next = game.insert_tile(Coord::new(0, 3)).unwrap();
        assert_eq!(next.side(Color::Blue).token, Coord::new(3, 3));
        assert_eq!(next.grid.find(Waypoint::Mountain), Some(Coord::new(2, 3)));
        assert_eq!(next.side(Color::Red).token, Coord::new(4, 5));

        // a token on the insertion cell is pushed inwards
        game.sides[1].token = Coord::new(0, 5);
        let next = game.insert_tile(Coord::new(0, 5)).unwrap();
        assert_eq!(next.side(Color::Blue).token, Coord::new(1, 5));
        assert_eq!(next.side(Color::Red).token, Coord::new(5, 5));
    }

    #[test]
    fn insertion_rules() {
        let game = Game::parse(BOARD).unwrap();
        for p in [(0i8, 0i8), (0, 2), (2, 0), (6, 6), (3, 3), (0, 7)] {
            assert!(!game.can_insert(Coord::from(p)), "{p:?}");
            assert_eq!(
                game.insert_tile(Coord::from(p)),
                Err(MoveError::InvalidPlacement(Coord::from(p)))
            );
        }
        // moon sits one cell inside the edge, so column 3 stays movable
        assert!(game.can_insert(Coord::new(0, 3)));
        assert!(game.can_insert(Coord::new(6, 3)));

        let next = game.insert_tile(Coord::new(3, 0)).unwrap();
        let next = next.pass_token().or_else(|_| {
            let to = next.destinations(Color::Red).iter().next().unwrap();
            next.place_token(to)
        });
        let next = next.unwrap();
        assert_eq!(next.to_move, Color::Blue);
        assert!(!next.can_insert(Coord::new(3, 6)));
        assert!(next.can_insert(Coord::new(1, 0)));
    }

    #[test]
    fn turn_phases() {
        let game = Game::parse(BOARD).unwrap();
        assert_eq!(
            game.place_token(Coord::new(5, 0)),
            Err(MoveError::MissingInsertion)
        );
        assert_eq!(game.pass_token(), Err(MoveError::MissingInsertion));

        let next = game.insert_tile(Coord::new(1, 0)).unwrap();
        assert_eq!(
            next.insert_tile(Coord::new(3, 0)),
            Err(MoveError::NoSpareTile(Color::Red))
        );
        assert_eq!(
            next.place_token(Coord::new(3, 3)),
            Err(MoveError::InvalidMove(Coord::new(3, 3)))
        );

        let mut over = game;
        over.winner = Some(Color::Blue);
        assert_eq!(over.insert_tile(Coord::new(1, 0)), Err(MoveError::GameOver));
        assert_eq!(over.outcome(), Outcome::Winner(Color::Blue));
    }

    #[test]
    fn reach_waypoint_and_return() {
        let game = Game::parse(
            r#"
            ┌s ─  ┬  ─  ┬  ─  ┐B
            │R ─  ─  ┬m ─  ─  │
            ├  ─  ─  │  ─  ─  ┤
            │  ─  ─  │  ─  ─  │
            ├  ─  ─  │  ─  ─  ┤
            │  ─  ─  ┴o ─  ─  │
            └  ─  ┴  ─  ┴  ─  ┘g
            "#,
        )
        .unwrap();

        // shifting column 3 leaves the first column in place
        let next = game.insert_tile(Coord::new(6, 3)).unwrap();
        assert!(next.destinations(Color::Red).contains(Coord::new(0, 0)));
        let next = next.place_token(Coord::new(0, 0)).unwrap();
        assert_eq!(next.side(Color::Red).progress, 1);
        assert_eq!(next.side(Color::Red).target(), Some(Waypoint::Moon));
        assert_eq!(next.to_move, Color::Blue);

        // returning home ends the game
        let mut game = game;
        game.sides[0].progress = Side::RETURNING;
        game.sides[0].token = Coord::new(5, 0);
        assert_eq!(game.goal(Color::Red), Some(Coord::new(6, 0)));
        let next = game.insert_tile(Coord::new(6, 3)).unwrap();
        let next = next.place_token(Coord::new(6, 0)).unwrap();
        assert_eq!(next.outcome(), Outcome::Winner(Color::Red));
        assert!(next.is_over());
    }

    #[test]
    fn snapshot_validation() {
        let game = Game::parse(BOARD).unwrap();
        let json = serde_json::to_value(game).unwrap();
        assert_eq!(serde_json::from_value::<Game>(json.clone()).unwrap(), game);

        let mut bad = json.clone();
        bad["last_insertion"] = serde_json::json!({"row": 9, "col": 2});
        assert!(serde_json::from_value::<Game>(bad).is_err());

        let mut bad = json.clone();
        bad["last_insertion"] = serde_json::json!({"row": 3, "col": 3});
        assert!(serde_json::from_value::<Game>(bad).is_err());

        let mut bad = json.clone();
        bad["sides"][1]["token"] = serde_json::json!({"row": -1, "col": 6});
        assert!(serde_json::from_value::<Game>(bad).is_err());

        let mut bad = json;
        bad["sides"][0]["progress"] = serde_json::json!(5);
        assert!(serde_json::from_value::<Game>(bad).is_err());

        let mut game = game;
        game.last_insertion = Some(Coord::new(0, 0));
        assert_eq!(
            game.validate(),
            Err(GameError::InvalidInsertion(Coord::new(0, 0)))
        );
        game.last_insertion = Some(Coord::new(1, 0));
        assert_eq!(game.validate(), Ok(()));
        game.sides[0].home = Coord::new(7, 0);
        assert_eq!(game.validate(), Err(GameError::OffBoard(Coord::new(7, 0))));
    }

    #[test]
    fn random_setup() {
        let game = Game::with_seed(42);
        println!("{game:?}");
        assert_eq!(game, Game::with_seed(42));
        assert_eq!(game.grid[Coord::new(0, 0)].waypoint, Some(Waypoint::Sun));
        assert_eq!(game.grid[Coord::new(6, 6)].waypoint, Some(Waypoint::Galaxy));
        for w in Waypoint::ALL {
            assert!(game.grid.find(w).is_some());
            assert!(game.sides.iter().all(|s| s.route.contains(&w)));
        }
        assert_eq!(game.grid[Coord::new(0, 2)].shape, Shape::TeeDown);
        assert_eq!(game.grid[Coord::new(4, 6)].shape, Shape::TeeLeft);
        assert!(game.side(Color::Red).spare.is_some());
        assert!(game.side(Color::Blue).spare.is_none());
        assert_eq!(game.to_move, Color::Red);

        let json = serde_json::to_string(&game).unwrap();
        let back: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(game, back);
    }
}
