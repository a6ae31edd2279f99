//! `lw id` command implementation.

use clap::Args;
use lw_config::CliSettings;
use lw_reload::{HttpIdFetcher, IdFetcher};

use super::ServerArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the id command.
#[derive(Args)]
pub(crate) struct IdArgs {
    #[command(flatten)]
    server: ServerArgs,
}

impl IdArgs {
    /// Fetch the session id once and print it on stdout.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let config = self.server.load(CliSettings::default())?;
        let id = HttpIdFetcher::new(&config.origin()).fetch().await?;
        Output::new().value(&id.to_string());
        Ok(())
    }
}
