// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hotvault - a secrets vault that only answers on the local hotspot network.
//!
//! This is the binary entry point.

mod detect;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hotvault_config::model::HotvaultConfig;

/// Hotvault - a secrets vault that only answers on the local hotspot network.
#[derive(Parser, Debug)]
#[command(name = "hotvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Show the detected hotspot subnet, known peers and a self-check.
    Detect,
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> HotvaultConfig {
    let result = match path {
        Some(path) => hotvault_config::load_and_validate_path(path),
        None => hotvault_config::load_and_validate(),
    };
    match result {
        Ok(config) => config,
        Err(errors) => {
            hotvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Detect) => detect::run_detect(&config).await,
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(hotvault_core::HotvaultError::Config(format!(
                "failed to render config: {e}"
            ))),
        },
        None => {
            println!("hotvault: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("hotvault: {e}");
        std::process::exit(1);
    }
}
