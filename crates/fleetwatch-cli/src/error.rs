//! CLI error types

use fleetwatch_clients::ClientError;
use thiserror::Error;

/// Errors that stop the report from being produced at all.
///
/// Check failures are not errors here; they are part of the report.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client construction error
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
