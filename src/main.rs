//! Unified vpn-panel CLI.
//!
//! This binary provides a unified interface to the panel components:
//! - `vpn-panel serve` - Run the management API
//! - `vpn-panel keys`  - Manage API keys
//!
//! Each subcommand can also be driven through its crate's `cli` module.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Vpn-panel unified CLI.
#[derive(Parser)]
#[command(
    name = "vpn-panel",
    version,
    about = "Multi-store VPN account lifecycle panel",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the management API server.
    #[command(name = "serve", alias = "server")]
    Serve(panel_api::cli::ServeArgs),

    /// Manage API keys.
    #[command(name = "keys")]
    Keys(panel_store::cli::KeysArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => panel_api::cli::run(args).await,
        Commands::Keys(args) => panel_store::cli::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
