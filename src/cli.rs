//! CLI module - command-line interface definitions
//!
//! Uses clap v4 with derive macros for argument parsing. The harness runs
//! with no required flags; trial and discard limits are compiled-in
//! defaults, not arguments.

use clap::Parser;

/// Platcheck - round-trip property harness for gem platform strings
#[derive(Parser, Debug)]
#[command(name = "platcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable JSON report output for machine consumption
    #[arg(long)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Fix the random seed for a reproducible run
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}
