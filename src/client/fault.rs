// Faults reported by cluster-management clients

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structured fault codes returned by the cluster-management endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCode {
    NodeNotFound,
    ApplicationNotFound,
    PartitionNotFound,
    ServiceNotFound,
    NetworkNotFound,
    NetworkAlreadyExists,
    NetworkInUse,
    UpgradeNotInProgress,
    InvalidState,
    InvalidArgument,
    AccessDenied,
    Internal,
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultCode::NodeNotFound => "NodeNotFound",
            FaultCode::ApplicationNotFound => "ApplicationNotFound",
            FaultCode::PartitionNotFound => "PartitionNotFound",
            FaultCode::ServiceNotFound => "ServiceNotFound",
            FaultCode::NetworkNotFound => "NetworkNotFound",
            FaultCode::NetworkAlreadyExists => "NetworkAlreadyExists",
            FaultCode::NetworkInUse => "NetworkInUse",
            FaultCode::UpgradeNotInProgress => "UpgradeNotInProgress",
            FaultCode::InvalidState => "InvalidState",
            FaultCode::InvalidArgument => "InvalidArgument",
            FaultCode::AccessDenied => "AccessDenied",
            FaultCode::Internal => "Internal",
        };
        f.write_str(name)
    }
}

/// Failure returned by a remote cluster-management call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFault {
    /// The endpoint answered with a structured failure
    #[error("{message}")]
    Fault { code: FaultCode, message: String },

    /// The endpoint could not confirm whether the operation took effect
    #[error("Operation outcome unknown: {message}")]
    Indeterminate { message: String },

    /// The endpoint could not be reached
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl RemoteFault {
    /// Create a structured fault
    pub fn fault(code: FaultCode, message: impl Into<String>) -> Self {
        Self::Fault {
            code,
            message: message.into(),
        }
    }

    /// Create an indeterminate-outcome fault
    pub fn indeterminate(message: impl Into<String>) -> Self {
        Self::Indeterminate {
            message: message.into(),
        }
    }

    /// Create a transport fault
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Fault code, for structured faults only
    pub fn code(&self) -> Option<FaultCode> {
        match self {
            RemoteFault::Fault { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Raw message text as produced by the endpoint
    pub fn message(&self) -> &str {
        match self {
            RemoteFault::Fault { message, .. }
            | RemoteFault::Indeterminate { message }
            | RemoteFault::Transport { message } => message,
        }
    }

    /// Whether the fault says the connection itself is unusable
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteFault::Transport { .. })
    }
}
