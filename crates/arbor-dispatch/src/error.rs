//! Setup errors.

use thiserror::Error;

/// Errors raised while configuring a controller, before any request runs.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A global tracing subscriber was already installed.
    #[error("logging error: {0}")]
    Logging(String),
}
