//! Structured logging initialization.

use crate::SetupError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable pretty format (for development).
    #[default]
    Pretty,
    /// JSON format (for log aggregation).
    Json,
}

impl LogFormat {
    /// Parse a log format, defaulting to pretty.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install a global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set.
///
/// # Errors
///
/// Returns [`SetupError::Logging`] if a global subscriber is already set.
///
/// # Example
///
/// ```rust,no_run
/// use arbor_dispatch::{init_logging, LogFormat};
///
/// init_logging("debug", LogFormat::Json).unwrap();
/// ```
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), SetupError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("arbor={level}", level = level).into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };
    result.map_err(|e| SetupError::Logging(e.to_string()))?;

    tracing::info!(level = %level, format = ?format, "Logging initialized");
    Ok(())
}
