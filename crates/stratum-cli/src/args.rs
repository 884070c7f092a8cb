//! Command-line argument definitions for the Stratum CLI.
//!
//! [`Args`] is parsed from the command line using [`clap`]. Arguments select
//! the model and output paths, the configuration file, the layout algorithm
//! and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Stratum layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input model (JSON)
    #[arg(help = "Path to the input model file")]
    pub input: String,

    /// Path to the output layout file; standard output when absent
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Layout algorithm, overriding the configuration file
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
