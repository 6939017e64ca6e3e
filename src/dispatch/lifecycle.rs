// Execution state machine

use crate::dispatch::error::FailureKind;
use serde::Serialize;
use thiserror::Error;

/// Where one command execution is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionState {
    Created,
    ParametersBound,
    ConnectionResolved,
    Invoked,
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: ExecutionState,
    pub to: ExecutionState,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionState::Succeeded
                | ExecutionState::Failed
                | ExecutionState::TimedOut
                | ExecutionState::Cancelled
        )
    }

    /// Terminal state reached by a failure of the given kind
    pub fn for_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::TimedOut => ExecutionState::TimedOut,
            FailureKind::Cancelled => ExecutionState::Cancelled,
            _ => ExecutionState::Failed,
        }
    }

    fn allows(self, next: ExecutionState) -> bool {
        use ExecutionState::*;
        match (self, next) {
            (Created, ParametersBound) => true,
            (ParametersBound, ConnectionResolved) => true,
            (ConnectionResolved, Invoked) => true,
            (Invoked, Succeeded | Failed | TimedOut | Cancelled) => true,
            // binding and resolution failures end the execution early
            (Created | ParametersBound, Failed | Cancelled) => true,
            _ => false,
        }
    }

    /// Move to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: ExecutionState) -> Result<(), InvalidTransition> {
        if !self.allows(next) {
            return Err(InvalidTransition { from: *self, to: next });
        }
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = ExecutionState::Created;
        for next in [
            ExecutionState::ParametersBound,
            ExecutionState::ConnectionResolved,
            ExecutionState::Invoked,
            ExecutionState::Succeeded,
        ] {
            state.advance(next).unwrap();
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn test_no_retry_transition() {
        let mut state = ExecutionState::Invoked;
        state.advance(ExecutionState::TimedOut).unwrap();
        assert!(state.advance(ExecutionState::Invoked).is_err());
        assert!(state.advance(ExecutionState::Succeeded).is_err());
        assert_eq!(state, ExecutionState::TimedOut);
    }

    #[test]
    fn test_cannot_skip_resolution() {
        let mut state = ExecutionState::ParametersBound;
        let err = state.advance(ExecutionState::Invoked).unwrap_err();
        assert_eq!(err.from, ExecutionState::ParametersBound);
        assert_eq!(state, ExecutionState::ParametersBound);
    }

    #[test]
    fn test_failure_states() {
        assert_eq!(ExecutionState::for_failure(FailureKind::TimedOut), ExecutionState::TimedOut);
        assert_eq!(ExecutionState::for_failure(FailureKind::RemoteFault), ExecutionState::Failed);
    }
}
