//! Command-line interface
//!
//! - init: create the data directory
//! - serve: open the stores and run the HTTP server
//! - summary: print summary statistics and exit

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve, summary, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
