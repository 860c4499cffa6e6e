//! tern-magicgen - finds slider magic numbers and prints them as Rust
//! constants ready to paste into the engine's magic table.
//!
//! Output goes to stdout, progress logging to stderr. The same seed always
//! produces the same tables.

mod finder;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use finder::{render_table, MagicFinder};
use tern_engine::{Slider, SliderTables, BISHOP_MAGICS, ROOK_MAGICS};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SliderArg {
    Bishop,
    Rook,
    Both,
}

/// Generate collision-free magic numbers for bishop and rook attack tables.
#[derive(Parser)]
#[command(name = "tern-magicgen")]
#[command(about = "Generates slider magic numbers")]
struct Args {
    /// Seed for the random candidate stream
    #[arg(long, default_value = "20240229")]
    seed: u64,

    /// Which slider tables to generate
    #[arg(long, value_enum, default_value = "both")]
    slider: SliderArg,

    /// Candidates to try per square before giving up
    #[arg(long, default_value = "100000000")]
    attempts: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    tracing::info!(seed = args.seed, slider = ?args.slider, "searching for magics");
    let mut finder = MagicFinder::new(args.seed, args.attempts);

    let bishops = match args.slider {
        SliderArg::Bishop | SliderArg::Both => finder
            .find_all(Slider::Bishop)
            .context("bishop magic search failed")?,
        SliderArg::Rook => BISHOP_MAGICS,
    };
    let rooks = match args.slider {
        SliderArg::Rook | SliderArg::Both => finder
            .find_all(Slider::Rook)
            .context("rook magic search failed")?,
        SliderArg::Bishop => ROOK_MAGICS,
    };

    let tables = SliderTables::with_magics(&bishops, &rooks)
        .context("generated magics failed verification")?;
    tracing::info!(slots = tables.table_len(), "magics verified");

    if args.slider != SliderArg::Rook {
        print!("{}", render_table("BISHOP_MAGICS", &bishops));
    }
    if args.slider != SliderArg::Bishop {
        print!("{}", render_table("ROOK_MAGICS", &rooks));
    }
    Ok(())
}
