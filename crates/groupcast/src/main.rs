// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groupcast - a group media relay daemon.
//!
//! Binary entry point: parses the CLI, loads and validates configuration,
//! and hands off to the serve loop.

mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Groupcast - relay media between messaging groups per a routing table.
#[derive(Parser, Debug)]
#[command(name = "groupcast", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to the standard lookup
    /// locations and GROUPCAST_* environment overrides).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => groupcast_config::load_config_from_path(path),
        None => groupcast_config::load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("groupcast: failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = groupcast_config::validate(&config) {
        eprintln!("groupcast: invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    match serve::run_serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("groupcast: {e}");
            ExitCode::FAILURE
        }
    }
}
