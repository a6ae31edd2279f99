//! Reload actions run by the CLI.

use std::sync::Arc;

use lw_reload::Reloader;
use tokio::process::Command;
use tokio::sync::Notify;

use crate::output::Output;

/// Runs the configured reload command, or prints a notice without one.
///
/// The command runs on its own task so `reload` returns at once. `done` is
/// signalled when the action has finished so the CLI can exit.
pub(crate) struct CliReloader {
    command: Option<Vec<String>>,
    done: Arc<Notify>,
}

impl CliReloader {
    pub(crate) fn new(command: Option<Vec<String>>, done: Arc<Notify>) -> Self {
        Self { command, done }
    }
}

impl Reloader for CliReloader {
    fn reload(&self) {
        let done = Arc::clone(&self.done);
        match self.command.clone() {
            Some(command) => {
                tokio::spawn(async move {
                    run_command(&command).await;
                    done.notify_one();
                });
            }
            None => {
                Output::new().highlight("Development server restarted, reload the page");
                done.notify_one();
            }
        }
    }
}

/// Run `command` to completion, logging failures.
async fn run_command(command: &[String]) {
    let Some((program, args)) = command.split_first() else {
        return;
    };

    match Command::new(program).args(args).status().await {
        Ok(status) if status.success() => {
            tracing::info!(%program, "Reload command finished");
        }
        Ok(status) => {
            tracing::warn!(%program, %status, "Reload command failed");
        }
        Err(err) => {
            tracing::warn!(%program, error = %err, "Failed to run reload command");
        }
    }
}
