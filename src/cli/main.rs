use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    version,
    about = "DoodleBoard - a sticky-note board for scribbles, folders and tags"
)]
pub struct Cli {
    /// Directory holding the board data (overrides the default location)
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the doodleboard application
    #[clap(subcommand)]
    pub command: Commands,
}
