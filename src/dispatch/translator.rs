// Translation of command failures into terminating errors

use crate::dispatch::descriptor::ErrorId;
use crate::dispatch::error::{CommandFailure, TerminatingError};
use crate::session::{ClusterConnection, Credential};
use log::debug;

/// How a command presents its failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContract {
    /// Surface the failure as-is, without an identifier
    Raw,
    /// Tag the failure with the command's stable identifier
    Decorated(ErrorId),
}

const REDACTED: &str = "<redacted>";

/// Removes credential material and connection internals from messages
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    secrets: Vec<String>,
}

impl Redactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_credential(credential: &Credential) -> Self {
        credential
            .secrets()
            .into_iter()
            .fold(Self::new(), |redactor, secret| redactor.with_secret(secret))
    }

    /// Redactor for failures observed on `connection`
    pub fn for_connection(connection: &ClusterConnection) -> Self {
        Self::from_credential(&connection.settings().credential).with_secret(connection.id().to_string())
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() && !self.secrets.contains(&secret) {
            self.secrets.push(secret);
        }
        self
    }

    pub fn redact(&self, message: &str) -> String {
        self.secrets
            .iter()
            .fold(message.to_string(), |text, secret| text.replace(secret.as_str(), REDACTED))
    }
}

/// Builds the operator-facing error for a failed execution
#[derive(Debug, Clone, Default)]
pub struct ErrorTranslator {
    redactor: Redactor,
}

impl ErrorTranslator {
    pub fn new(redactor: Redactor) -> Self {
        Self { redactor }
    }

    pub fn translate(&self, failure: &CommandFailure, contract: ErrorContract) -> TerminatingError {
        let error_id = match contract {
            ErrorContract::Raw => None,
            ErrorContract::Decorated(id) => Some(id),
        };
        debug!("translating {} failure (contract: {:?})", failure.kind(), contract);

        TerminatingError {
            error_id,
            kind: failure.kind(),
            fault_code: failure.fault_code(),
            message: self.redactor.redact(&failure.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FaultCode, RemoteFault};
    use crate::dispatch::error::FailureKind;

    #[test]
    fn test_decorated_keeps_fault_text() {
        let failure = CommandFailure::from(RemoteFault::fault(
            FaultCode::UpgradeNotInProgress,
            "Upgrade not in progress",
        ));
        let error = ErrorTranslator::default()
            .translate(&failure, ErrorContract::Decorated(ErrorId::RollbackApplicationUpgrade));

        assert_eq!(error.error_id_str(), Some("RollbackApplicationUpgradeErrorId"));
        assert_eq!(error.kind, FailureKind::RemoteFault);
        assert_eq!(error.fault_code, Some(FaultCode::UpgradeNotInProgress));
        assert_eq!(error.message, "Upgrade not in progress");
    }

    #[test]
    fn test_raw_has_no_identifier() {
        let failure = CommandFailure::connection_unavailable("No cluster connection is configured.");
        let error = ErrorTranslator::default().translate(&failure, ErrorContract::Raw);
        assert_eq!(error.error_id, None);
        assert_eq!(error.kind, FailureKind::ConnectionUnavailable);
    }

    #[test]
    fn test_secrets_are_redacted() {
        let credential = Credential::Token {
            token: "tok-123".to_string(),
        };
        let translator = ErrorTranslator::new(Redactor::from_credential(&credential).with_secret("conn-42"));
        let failure = CommandFailure::from(RemoteFault::fault(
            FaultCode::AccessDenied,
            "token tok-123 rejected on conn-42",
        ));

        let error = translator.translate(&failure, ErrorContract::Raw);
        assert!(!error.message.contains("tok-123"));
        assert!(!error.message.contains("conn-42"));
        assert_eq!(error.message, "token <redacted> rejected on <redacted>");
    }
}
