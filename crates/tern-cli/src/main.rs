//! tern - command line front end for the tern engine.
//!
//! Sets up a position from `--fen` (default: the start position), optionally
//! plays `--play` moves on it, then runs one subcommand. Results go to stdout
//! as text or JSON; logging goes to stderr.

mod config;
mod output;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use config::TernConfig;
use output::{emit, DivideEntry, EvalOutput, LayerOutput, MovesOutput, PerftOutput, SearchOutput};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tern_core::{Square, UciMove, STARTPOS};
use tern_engine::{
    evaluate, find_move, game_phase, legal_destinations, legal_moves, perft, perft_divide,
    Engine, Position, SearchLimit, Searcher, LAYER_NAMES,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_SEARCH_DEPTH: u8 = 6;

#[derive(Parser)]
#[command(name = "tern")]
#[command(about = "Bitboard chess engine: search, perft and evaluation")]
struct Cli {
    /// Position to work on
    #[arg(long, global = true, default_value = STARTPOS)]
    fen: String,

    /// UCI moves to play from the position first, comma separated
    #[arg(long, global = true, value_delimiter = ',')]
    play: Vec<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: tern.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the best move
    Search {
        /// Fixed search depth
        #[arg(long, conflicts_with = "movetime")]
        depth: Option<u8>,

        /// Time budget in milliseconds
        #[arg(long)]
        movetime: Option<u64>,
    },

    /// Count leaf nodes of the legal move tree
    Perft {
        /// Depth in plies
        depth: u32,

        /// Show the count below each root move
        #[arg(long)]
        divide: bool,
    },

    /// Evaluate the position
    Eval {
        /// Also run a fixed-depth search and report its score
        #[arg(long)]
        deep: Option<u8>,
    },

    /// List legal moves
    Moves {
        /// Only moves starting on this square
        #[arg(long)]
        square: Option<String>,
    },

    /// Show a named bitboard layer (e.g. wk, ao, km, r3)
    Layer {
        /// Layer name; `list` prints all names
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TernConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TernConfig::load().context("loading tern.toml")?,
    };
    tracing::debug!(config = ?config.engine, "config loaded");

    let engine = Engine::new();
    let mut position = setup_position(&engine, &cli.fen, &cli.play)?;
    let fen = position.to_fen();

    match cli.command {
        Commands::Search { depth, movetime } => {
            let limit = match (depth, movetime) {
                (_, Some(ms)) => SearchLimit::Time(Duration::from_millis(ms)),
                (Some(depth), None) => SearchLimit::Depth(depth),
                (None, None) => SearchLimit::Depth(DEFAULT_SEARCH_DEPTH),
            };
            let mut searcher = Searcher::new(&config.engine);
            let report = searcher.search(&mut position, limit);
            emit(&SearchOutput::new(fen, &report), cli.json)?;
        }
        Commands::Perft { depth, divide } => {
            let started = Instant::now();
            let (nodes, divide) = if divide {
                let entries: Vec<DivideEntry> = perft_divide(&mut position, depth)
                    .into_iter()
                    .map(|(mv, nodes)| DivideEntry { mv, nodes })
                    .collect();
                (entries.iter().map(|e| e.nodes).sum(), entries)
            } else {
                (perft(&mut position, depth), Vec::new())
            };
            let output = PerftOutput {
                fen,
                depth,
                nodes,
                time_ms: started.elapsed().as_millis() as u64,
                divide,
            };
            emit(&output, cli.json)?;
        }
        Commands::Eval { deep } => {
            let us = position.side_to_move();
            let deep_eval = deep.map(|depth| {
                let mut searcher = Searcher::new(&config.engine);
                searcher.deep_eval(&mut position, depth)
            });
            let output = EvalOutput {
                fen,
                side_to_move: us.to_string(),
                static_eval: evaluate(&position, us, &config.engine.eval),
                phase: game_phase(&position),
                in_check: position.is_check(),
                deep_eval,
                deep_depth: deep,
            };
            emit(&output, cli.json)?;
        }
        Commands::Moves { square } => {
            let output = match square {
                Some(text) => {
                    let sq = Square::from_algebraic(&text)
                        .with_context(|| format!("invalid square '{}'", text))?;
                    let moves = legal_destinations(&mut position, sq)
                        .into_iter()
                        .map(|to| format!("{}{}", sq, to))
                        .collect();
                    MovesOutput {
                        fen,
                        from: Some(sq.to_algebraic()),
                        moves,
                    }
                }
                None => {
                    let mut moves: Vec<String> =
                        legal_moves(&mut position).iter().map(|m| m.to_uci()).collect();
                    moves.sort();
                    MovesOutput {
                        fen,
                        from: None,
                        moves,
                    }
                }
            };
            emit(&output, cli.json)?;
        }
        Commands::Layer { name } => {
            if name == "list" {
                println!("{}", LAYER_NAMES.join(" "));
                return Ok(());
            }
            let Some(board) = position.layer(&name) else {
                bail!("unknown layer '{}'; try `tern layer list`", name);
            };
            emit(&LayerOutput::new(&name, board), cli.json)?;
        }
    }
    Ok(())
}

/// Parses `fen` and plays `moves` on it, rejecting anything illegal.
fn setup_position<'e>(engine: &'e Engine, fen: &str, moves: &[String]) -> anyhow::Result<Position<'e>> {
    let mut position =
        Position::from_fen(engine, fen).with_context(|| format!("invalid FEN '{}'", fen))?;
    for text in moves {
        let uci: UciMove = text.parse()?;
        let Some(mv) = find_move(&mut position, &uci) else {
            bail!("illegal move {} in {}", uci, position.to_fen());
        };
        position.apply(mv);
    }
    Ok(position)
}
