//! Command-line argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trust bundle synchronization daemon
///
/// Keeps configured trust bundles in sync with their remote sources:
/// downloads, authenticates, and atomically replaces each bundle's
/// trust anchor set on a fixed schedule.
#[derive(Parser, Debug)]
#[command(name = "trustsyncd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "TRUSTSYNC_CONFIG", default_value = "trustsync.toml")]
    pub config: PathBuf,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the periodic bundle refresh daemon
    Run {
        /// Run a single cache-update cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Force an immediate refresh of one bundle, ignoring its interval
    Refresh {
        /// Bundle name
        name: String,
    },

    /// Show configured bundles and their refresh status
    Status,
}
