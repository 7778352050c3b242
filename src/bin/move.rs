use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use mazeshift::env::{MoveRequest, MoveResponse};
use mazeshift::{logging, Agent};

#[derive(Parser)]
#[command(name = "mazeshift move", about = "Choose the next move for a game snapshot.")]
struct Opts {
    /// Agent used if the request does not specify one.
    #[arg(long, default_value_t)]
    config: Agent,
    /// JSON move request.
    #[arg(value_parser = parse_request, required_unless_present = "file")]
    request: Option<MoveRequest>,
    /// File containing the JSON move request.
    #[arg(long, conflicts_with = "request")]
    file: Option<PathBuf>,
}

fn parse_request(s: &str) -> Result<MoveRequest, serde_json::Error> {
    serde_json::from_str(s)
}

fn main() -> Result<(), Box<dyn Error>> {
    logging();

    let Opts {
        config,
        request,
        file,
    } = Opts::parse();

    let request = match (request, file) {
        (Some(request), _) => request,
        (None, Some(file)) => serde_json::from_reader(BufReader::new(File::open(file)?))?,
        (None, None) => return Err("no move request given".into()),
    };
    info!("{:?}", request.game);

    let agent = request.agent.unwrap_or(config);
    info!("{agent}");
    let result = agent.step(&request.game)?;
    info!("path={:?} {:?}", result.path, result.stats);

    let response = MoveResponse::new(result.mv, result.score);
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
