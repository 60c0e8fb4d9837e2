//! CLI error types and exit codes

use idstore_connector_aws::{ConnectError, SettingsError};
use idstore_provisioning::ProvisionError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success (per-record failures are reported, not fatal)
/// - 1: Settings or logging error
/// - 2: Input file missing or invalid
/// - 3: Identity store connection error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Input(#[from] ProvisionError),

    #[error("Connection failed: {0}")]
    Connection(#[from] ConnectError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Settings(_) | CliError::Config(_) | CliError::Output(_) => 1,
            CliError::Input(_) => 2,
            CliError::Connection(_) => 3,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Settings(SettingsError::Read { .. }) => {
                Some("Create the settings file or pass its location with --settings.")
            }
            CliError::Input(ProvisionError::InputMissing { .. }) => {
                Some("Pass the users file with --input.")
            }
            CliError::Connection(ConnectError::NoCredentials { .. }) => {
                Some("Run 'aws sso login --profile <SSO_PROFILE>' and try again.")
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(format!("JSON error: {}", e))
    }
}
