//! AVAS CLI - builds flashable sound images from WAV folders
//!
//! # Commands
//!
//! - `avas convert` - Convert a folder of WAV files into a sound image
//! - `avas config` - Show or change the persisted output path preference
//!
//! # Usage
//!
//! ```bash
//! # Event sound: one Intel-HEX artifact, content-sized image
//! avas convert --input ./sounds --sound-type event
//!
//! # Engine sound: review the 10 position slots interactively, then emit
//! # bin + C header (fixed 864 KB image at 0x10118000)
//! avas convert --input ./sounds --sound-type engine
//!
//! # Engine sound without the interactive review
//! avas convert --input ./sounds --sound-type engine --accept-defaults
//! ```

mod config;
mod convert;
mod pipeline;
mod runlog;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// AVAS CLI - builds flashable sound images from WAV folders
#[derive(Parser)]
#[command(name = "avas")]
#[command(about = "Build AVAS firmware sound images from WAV folders")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a folder of WAV files into a sound image
    Convert(convert::ConvertArgs),

    /// Show or change the persisted output path preference
    Config(config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => convert::execute(args),
        Commands::Config(args) => config::execute(args),
    }
}
