//! lw CLI - Live reload watcher.
//!
//! Provides commands for:
//! - `watch`: Poll the development server and reload when it restarts
//! - `id`: Print the development server's current session id

mod commands;
mod error;
mod output;
mod reload;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{IdArgs, WatchArgs};
use output::Output;

/// lw - Live reload watcher.
#[derive(Parser)]
#[command(name = "lw", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the development server and reload when it restarts.
    Watch(WatchArgs),
    /// Print the development server's current session id.
    Id(IdArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Check if verbose flag is set for watch command
    let verbose = matches!(&cli.command, Commands::Watch(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = match cli.command {
        Commands::Watch(args) => rt.block_on(args.execute()),
        Commands::Id(args) => rt.block_on(args.execute()),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
