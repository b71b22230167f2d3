//! Cyclone CLI - command-line interface for the reference-cycle detector
//!
//! Analyzes symbol snapshots of compiled code for serializable object graphs
//! that may contain reference cycles.

mod cli;
mod commands;
mod logging;
mod output;

use clap::Parser;

use cli::Cli;
use commands::Commands;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli);

    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Explain(args) => args.run(),
    }
}
