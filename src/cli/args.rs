//! CLI argument definitions using clap
//!
//! Commands:
//! - admissions serve --config <path> [--port <port>]
//! - admissions filter --config <path>
//! - admissions aggregate --config <path>
//! - admissions options --config <path> [--region <name>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hospital admissions filtering and demographics service
#[derive(Parser, Debug)]
#[command(name = "admissions")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,

        /// Port to listen on, overriding the configured one
        #[arg(long)]
        port: Option<u16>,
    },

    /// Read one filter request from stdin and print one page
    Filter {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,
    },

    /// Read one `{diagnosis, breakdown}` request from stdin and print it
    Aggregate {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,
    },

    /// Print filter options, or the centers of one region
    Options {
        /// Path to configuration file
        #[arg(long, default_value = "./admissions.json")]
        config: PathBuf,

        /// List the centers of this region instead
        #[arg(long)]
        region: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
