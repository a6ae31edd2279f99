//! `lw watch` command implementation.

use std::sync::Arc;

use clap::Args;
use lw_config::{CliSettings, Config};
use lw_reload::{HttpIdFetcher, ID_ENDPOINT, PollPolicy, ReloadWatcher};
use tokio::sync::Notify;

use super::ServerArgs;
use crate::error::CliError;
use crate::output::Output;
use crate::reload::CliReloader;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    #[command(flatten)]
    server: ServerArgs,

    /// Skip a poll while the previous one is still outstanding.
    #[arg(long)]
    serialize_polls: bool,

    /// Enable verbose output (log baseline and reload).
    #[arg(short, long)]
    pub verbose: bool,

    /// Command run when the server restarts (overrides config).
    #[arg(last = true)]
    command: Vec<String>,
}

/// How the watch ended.
enum Outcome {
    Reloaded,
    Inactive,
    Interrupted,
}

impl WatchArgs {
    /// Execute the watch command.
    ///
    /// Returns once the reload has run, or with an error if the server never
    /// answered the initial session id request.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.load_config()?;

        let origin = config.origin();
        let policy = if config.reload.serialize_polls {
            PollPolicy::Serialized
        } else {
            PollPolicy::Concurrent
        };

        output.info(&format!("Watching {origin}{ID_ENDPOINT}"));
        match &config.reload.command {
            Some(command) => output.info(&format!("Reload command: {}", command.join(" "))),
            None => output.info("Reload command: none (notify only)"),
        }

        let done = Arc::new(Notify::new());
        let reloader = CliReloader::new(config.reload.command.clone(), Arc::clone(&done));
        let mut handle = ReloadWatcher::new(HttpIdFetcher::new(&origin), reloader)
            .with_policy(policy)
            .start();

        let outcome = tokio::select! {
            () = done.notified() => Outcome::Reloaded,
            false = handle.wait_for_reload() => Outcome::Inactive,
            () = shutdown_signal() => Outcome::Interrupted,
        };

        match outcome {
            Outcome::Reloaded => {
                output.success("Reloaded");
                Ok(())
            }
            Outcome::Inactive => Err(CliError::Inactive(origin)),
            Outcome::Interrupted => {
                handle.stop();
                output.warning("Stopped watching");
                Ok(())
            }
        }
    }

    /// Load config with the server overrides and the trailing command.
    fn load_config(self) -> Result<Config, CliError> {
        let extra = CliSettings {
            command: (!self.command.is_empty()).then_some(self.command),
            serialize_polls: self.serialize_polls.then_some(true),
            ..Default::default()
        };
        self.server.load(extra)
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping watcher...");
}
