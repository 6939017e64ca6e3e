// Failure taxonomy and terminating errors

use crate::client::{FaultCode, RemoteFault};
use crate::dispatch::descriptor::ErrorId;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Classification of a failed command execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    /// No resolvable endpoint
    ConnectionUnavailable,
    /// Parameters could not be bound
    InvalidArgument,
    /// Deadline elapsed before completion
    TimedOut,
    /// External cancellation observed before completion
    Cancelled,
    /// Outcome of the call is indeterminate
    Unknown,
    /// Endpoint returned a structured failure
    RemoteFault,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::ConnectionUnavailable => "ConnectionUnavailable",
            FailureKind::InvalidArgument => "InvalidArgument",
            FailureKind::TimedOut => "TimedOut",
            FailureKind::Cancelled => "Cancelled",
            FailureKind::Unknown => "Unknown",
            FailureKind::RemoteFault => "RemoteFault",
        };
        f.write_str(name)
    }
}

/// Raw failure of one command execution, before translation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandFailure {
    #[error("{reason}")]
    ConnectionUnavailable { reason: String },

    #[error("Invalid value for {argument}: {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("The operation timed out after {timeout:?}.")]
    TimedOut { timeout: Duration },

    #[error("The operation was cancelled.")]
    Cancelled,

    #[error("The outcome of the operation is unknown: {message}")]
    Unknown { message: String },

    #[error(transparent)]
    Remote(#[from] RemoteFault),
}

impl CommandFailure {
    pub fn connection_unavailable(reason: impl Into<String>) -> Self {
        Self::ConnectionUnavailable {
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CommandFailure::ConnectionUnavailable { .. } => FailureKind::ConnectionUnavailable,
            CommandFailure::InvalidArgument { .. } => FailureKind::InvalidArgument,
            CommandFailure::TimedOut { .. } => FailureKind::TimedOut,
            CommandFailure::Cancelled => FailureKind::Cancelled,
            CommandFailure::Unknown { .. } => FailureKind::Unknown,
            CommandFailure::Remote(_) => FailureKind::RemoteFault,
        }
    }

    /// Fault code of the underlying remote fault, if any
    pub fn fault_code(&self) -> Option<FaultCode> {
        match self {
            CommandFailure::Remote(fault) => fault.code(),
            _ => None,
        }
    }
}

/// Failure reported to the operator; ends the command execution
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct TerminatingError {
    /// Identifier of the command that failed, for decorated commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<ErrorId>,
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_code: Option<FaultCode>,
    pub message: String,
}

impl TerminatingError {
    /// Stable identifier string, e.g. `RollbackApplicationUpgradeErrorId`
    pub fn error_id_str(&self) -> Option<&'static str> {
        self.error_id.map(ErrorId::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(CommandFailure::Cancelled.kind(), FailureKind::Cancelled);
        assert_eq!(
            CommandFailure::TimedOut {
                timeout: Duration::from_secs(30)
            }
            .to_string(),
            "The operation timed out after 30s."
        );

        let remote: CommandFailure = RemoteFault::fault(FaultCode::NetworkInUse, "Network 'n' is in use.").into();
        assert_eq!(remote.kind(), FailureKind::RemoteFault);
        assert_eq!(remote.fault_code(), Some(FaultCode::NetworkInUse));
        assert_eq!(remote.to_string(), "Network 'n' is in use.");
    }
}
