//! CLI error types.

use lw_config::ConfigError;
use lw_reload::NetworkError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch session id: {0}")]
    Network(#[from] NetworkError),

    #[error("Live reload inactive: no session id from {0}")]
    Inactive(String),
}
