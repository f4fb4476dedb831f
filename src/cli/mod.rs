//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP API
//! - filter: One-shot filtered page
//! - aggregate: One-shot demographic breakdown
//! - options: One-shot filter options

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{aggregate, filter, options, run, run_command, serve, Breakdown};
pub use config::{BirthYearConfig, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
