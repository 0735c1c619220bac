use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    extract::{self, ExtractArgs},
    ledger::{self, LedgerArgs},
    sweep::{self, SweepArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "crust-sim", about = "crustcool parameter sweeps and grid extraction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render, run and collect every point of a sweep configuration.
    Sweep(SweepArgs),
    /// Pull a filtered (x, y) series out of a result grid.
    Extract(ExtractArgs),
    /// List recorded run outcomes from a sweep ledger.
    Ledger(LedgerArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Sweep(args) => sweep::run(&args),
        Command::Extract(args) => extract::run(&args),
        Command::Ledger(args) => ledger::run(&args),
    }
}
