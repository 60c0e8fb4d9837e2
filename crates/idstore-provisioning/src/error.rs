//! Error types for provisioning runs.
//!
//! Only input problems are fatal. Directory failures during a run are
//! recorded per record or per group and never surface as a `ProvisionError`.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for fatal provisioning errors.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Fatal errors that stop a run before any directory call is made.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The input table could not be opened or read.
    #[error("File '{}' not found or unreadable: {source}", path.display())]
    InputMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input table is empty or lacks a required column.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ProvisionError {
    /// Stable code for logs and reports.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ProvisionError::InputMissing { .. } => "input_missing",
            ProvisionError::InvalidInput(_) => "invalid_input",
        }
    }
}
