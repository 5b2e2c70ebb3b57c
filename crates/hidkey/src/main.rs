//! Entry point for the `hidkey` binary.

mod cli;
mod error;
mod inspect;
mod replay;
mod script;

use std::process;

use clap::Parser;
use tracing::error;

use crate::{
    cli::{Cli, Commands},
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli { log, command } = Cli::parse();
    logging::init(&log.spec());

    match command {
        Commands::Replay(args) => replay::run(&args),
        Commands::Channels(args) => inspect::channels(&args),
        Commands::Check(args) => inspect::check(&args),
    }
}
