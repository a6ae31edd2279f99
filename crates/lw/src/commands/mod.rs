//! CLI command implementations.

pub(crate) mod id;
pub(crate) mod watch;

pub(crate) use id::IdArgs;
pub(crate) use watch::WatchArgs;

use std::path::PathBuf;

use clap::Args;
use lw_config::{CliSettings, Config};

use crate::error::CliError;

/// Development server location, shared by all commands.
#[derive(Args)]
pub(crate) struct ServerArgs {
    /// Path to configuration file (default: auto-discover lw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Development server host (overrides config).
    #[arg(long, conflicts_with = "url")]
    host: Option<String>,

    /// Development server port (overrides config).
    #[arg(short, long, conflicts_with = "url")]
    port: Option<u16>,

    /// Full development server URL, e.g. http://localhost:8080 (replaces host and port).
    #[arg(long)]
    url: Option<String>,
}

impl ServerArgs {
    /// Load config with the server overrides plus `extra` command settings.
    pub(crate) fn load(self, extra: CliSettings) -> Result<Config, CliError> {
        let settings = CliSettings {
            host: self.host,
            port: self.port,
            url: self.url,
            ..extra
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}
