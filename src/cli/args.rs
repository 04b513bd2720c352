//! CLI argument definitions using clap
//!
//! Commands:
//! - rosterdb init --config <path>
//! - rosterdb serve --config <path> [--port <port>]
//! - rosterdb summary --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rosterdb - student records over a checksummed document store
#[derive(Parser, Debug)]
#[command(name = "rosterdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory
    Init {
        #[arg(long, default_value = "./rosterdb.json")]
        config: PathBuf,
    },

    /// Open the stores and serve the HTTP API until interrupted
    Serve {
        #[arg(long, default_value = "./rosterdb.json")]
        config: PathBuf,

        /// Overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print summary statistics as one JSON line and exit
    Summary {
        #[arg(long, default_value = "./rosterdb.json")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_port_is_optional() {
        let cli = Cli::try_parse_from(["rosterdb", "serve"]).unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("./rosterdb.json"));
                assert_eq!(port, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_serve_with_port() {
        let cli =
            Cli::try_parse_from(["rosterdb", "serve", "--config", "a.json", "--port", "4000"])
                .unwrap();
        assert!(matches!(cli.command, Command::Serve { port: Some(4000), .. }));
    }
}
