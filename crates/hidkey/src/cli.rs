//! Command-line interface definitions for hidkey.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `hidkey` binary.
#[derive(Parser, Debug)]
#[command(
    name = "hidkey",
    about = "Classify HID key samples into clicks, long presses and repeats",
    version
)]
pub struct Cli {
    /// Logging controls shared across hidkey binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Which command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a sample script through the engine and print channel updates.
    Replay(ReplayArgs),
    /// List every channel the engine publishes to.
    Channels(ChannelsArgs),
    /// Load and validate a config file.
    Check(CheckArgs),
}

/// Arguments for the `replay` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Script of `[@<ms>] [<code>]` lines; reads stdin when omitted.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Config file (defaults to ~/.hidkey/config.ron).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the configured key-up timeout, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Print one JSON object per update instead of `channel=value`.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `channels` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ChannelsArgs {
    /// Print the catalog as a JSON array.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Config file (defaults to ~/.hidkey/config.ron).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
