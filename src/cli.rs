//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vidserve")]
#[command(about = "Partial-content video streaming server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults are searched otherwise)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the streaming server (the default)
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Verify that external tools are available
    CheckTools,
    /// Validate a config file and exit
    Validate {
        /// Config file to validate
        config: PathBuf,
    },
}
