// CLI error types and handling

use crate::session::ConfigError;
use std::process::ExitCode;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Failures that stop the CLI before a command runs
#[derive(Error, Debug)]
pub enum CliError {
    /// Session configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid argument value
    #[error("Invalid argument value for {arg}: {reason}")]
    InvalidArgumentValue { arg: String, reason: String },

    /// Terminal I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn invalid_argument(arg: impl Into<String>, reason: impl Into<String>) -> Self {
        CliError::InvalidArgumentValue {
            arg: arg.into(),
            reason: reason.into(),
        }
    }

    /// Usage and configuration problems exit with 2
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(2)
    }
}
