use std::error::Error;
use std::time::Instant;

use clap::Parser;
use log::warn;
use owo_colors::OwoColorize;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use mazeshift::env::Color;
use mazeshift::game::{Game, Outcome};
use mazeshift::{choose_move, logging, Agent};

#[derive(Parser)]
#[command(
    name = "mazeshift simulator",
    about = "Simulate games between two agents."
)]
struct Opts {
    #[arg(short, long, default_value_t = 1)]
    game_count: usize,
    /// Board seed of the first game, following games increment it.
    #[arg(long)]
    seed: Option<u64>,
    /// Games without a winner after this many turns are a draw.
    #[arg(long, default_value_t = 200)]
    max_turns: usize,
    #[arg(short, long)]
    verbose: bool,
    /// Agents playing red and blue, missing ones use the default agent.
    #[arg(num_args = 0..=2)]
    agents: Vec<Agent>,
}

fn main() -> Result<(), Box<dyn Error>> {
    logging();

    let Opts {
        game_count,
        seed,
        max_turns,
        verbose,
        mut agents,
    } = Opts::parse();
    agents.resize(2, Agent::default());

    let start = Instant::now();
    let mut rng = SmallRng::from_entropy();
    let mut wins = [0; 2];
    let mut draws = 0;

    for i in 0..game_count {
        let game = match seed {
            Some(seed) => Game::with_seed(seed + i as u64),
            None => Game::random(&mut rng),
        };
        match play_game(&agents, game, max_turns, verbose)? {
            Some(color) => wins[color.index()] += 1,
            None => draws += 1,
        }
        println!(
            "{}: {} {}ms",
            "Finish Game".bright_green(),
            i,
            start.elapsed().as_millis()
        );
    }

    println!(
        "Result: {} {} / {} {} / draws {} of {}",
        "red".bright_red(),
        wins[Color::Red.index()],
        "blue".bright_blue(),
        wins[Color::Blue.index()],
        draws,
        game_count
    );
    Ok(())
}

fn play_game(
    agents: &[Agent],
    mut game: Game,
    max_turns: usize,
    verbose: bool,
) -> Result<Option<Color>, Box<dyn Error>> {
    if verbose {
        println!("init: {game:?}");
    }

    for turn in 0..max_turns {
        let color = game.to_move;
        let Some(mv) = choose_move(&game, &agents[color.index()])? else {
            warn!("{color:?} has no legal move");
            return Ok(None);
        };
        game = game.apply(mv)?;

        if verbose {
            println!("{turn}: {mv:?} {game:?}");
        }
        if let Outcome::Winner(winner) = game.outcome() {
            println!("game: {winner:?} wins after {turn} turns");
            return Ok(Some(winner));
        }
    }
    println!("game: draw after {max_turns} turns");
    Ok(None)
}
