// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tether - health-checked connections to directory, database, and
//! file-transfer backends.
//!
//! This is the binary entry point.

mod doctor;
mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tether - health-checked backend connections.
#[derive(Parser, Debug)]
#[command(name = "tether", version, about, long_about = None)]
struct Cli {
    /// Load this file instead of searching the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Test every configured adapter and report its health.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print configured adapters with defaults applied.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => tether_config::load_and_validate_path(path),
        None => tether_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tether_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);
    tracing::debug!(adapters = config.adapters.len(), "config loaded");

    match cli.command {
        Some(Commands::Doctor { plain }) => match doctor::run_doctor(&config, plain).await {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("tether doctor: {e}");
                std::process::exit(1);
            }
        },
        Some(Commands::Config) => show::run_config(&config),
        None => {
            println!("tether: use --help for available commands");
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let directives = ["tether", "tether_adapter", "tether_pool", "tether_registry"]
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{directives},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn doctor_accepts_plain_and_global_config() {
        let cli = Cli::parse_from(["tether", "doctor", "--plain", "--config", "/tmp/t.toml"]);
        assert!(matches!(cli.command, Some(Commands::Doctor { plain: true })));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
    }

    #[test]
    fn config_subcommand_parses() {
        let cli = Cli::parse_from(["tether", "config"]);
        assert!(matches!(cli.command, Some(Commands::Config)));
        assert!(cli.config.is_none());
    }
}
