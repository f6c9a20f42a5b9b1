//! Driver error types.

use domain::DomainError;
use thiserror::Error;

/// Failures that abort a script run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
