// Deadline- and cancellation-aware execution of a single remote call

use crate::client::RemoteFault;
use crate::dispatch::command::RemoteCall;
use crate::dispatch::descriptor::InvocationShape;
use crate::dispatch::error::CommandFailure;
use crate::dispatch::timeout::OperationDeadline;
use crate::dispatch::types::{CallOutcome, CommandRequest, CommandResult};
use log::{debug, warn};

/// What the invoker observed first
enum Observed {
    Cancelled,
    Elapsed,
    Completed(Result<CallOutcome, RemoteFault>),
    Crashed(String),
}

/// Runs exactly one remote call per request
///
/// On every wake-up the cancellation signal is checked first, then the
/// deadline, then the call. Once a terminal outcome is observed any later
/// completion of the call is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandInvoker;

impl CommandInvoker {
    pub fn new() -> Self {
        Self
    }

    pub async fn invoke(
        &self,
        request: CommandRequest,
        deadline: &OperationDeadline,
        shape: InvocationShape,
        call: RemoteCall,
    ) -> CommandResult {
        debug!(
            "invoking {} on {} (request {}, timeout {:?}, {:?})",
            request.kind(),
            request.target(),
            request.request_id(),
            deadline.timeout(),
            shape
        );

        let observed = match shape {
            InvocationShape::Synchronous => Self::drive_inline(deadline, call).await,
            InvocationShape::Awaited => Self::drive_spawned(deadline, call).await,
        };

        let result = match observed {
            Observed::Completed(Ok(outcome)) => CommandResult::Succeeded(outcome),
            Observed::Completed(Err(RemoteFault::Indeterminate { message })) => {
                CommandResult::Failed(CommandFailure::unknown(message))
            }
            Observed::Completed(Err(fault)) => CommandResult::Failed(fault.into()),
            Observed::Crashed(message) => {
                warn!("remote call task of request {} failed: {}", request.request_id(), message);
                CommandResult::Failed(CommandFailure::unknown(message))
            }
            Observed::Elapsed => {
                // let the client abandon the call
                deadline.cancel_token().cancel();
                CommandResult::Failed(CommandFailure::TimedOut {
                    timeout: deadline.timeout(),
                })
            }
            Observed::Cancelled => CommandResult::Failed(CommandFailure::Cancelled),
        };

        debug!(
            "request {} finished after {} ms: {}",
            request.request_id(),
            (chrono::Utc::now() - request.created_at()).num_milliseconds(),
            result
                .failure()
                .map_or_else(|| "succeeded".to_string(), |failure| failure.kind().to_string())
        );
        result
    }

    async fn drive_inline(deadline: &OperationDeadline, call: RemoteCall) -> Observed {
        let cancel = deadline.cancel_token();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Observed::Cancelled,
            _ = tokio::time::sleep_until(deadline.deadline()) => Observed::Elapsed,
            result = call => Observed::Completed(result),
        }
    }

    async fn drive_spawned(deadline: &OperationDeadline, call: RemoteCall) -> Observed {
        let cancel = deadline.cancel_token();
        let mut handle = tokio::spawn(call);

        let observed = tokio::select! {
            biased;
            _ = cancel.cancelled() => Observed::Cancelled,
            _ = tokio::time::sleep_until(deadline.deadline()) => Observed::Elapsed,
            joined = &mut handle => match joined {
                Ok(result) => Observed::Completed(result),
                Err(e) => Observed::Crashed(e.to_string()),
            },
        };

        if !handle.is_finished() {
            // clients that ignore the token are stopped at their next await
            cancel.cancel();
            handle.abort();
        }
        observed
    }
}
