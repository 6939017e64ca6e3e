// Administrative command trait

use crate::client::{CallOptions, RemoteFault};
use crate::dispatch::descriptor::CommandKind;
use crate::dispatch::error::CommandFailure;
use crate::dispatch::types::{CallOutcome, CommandRequest};
use crate::session::{ClusterConnection, ConnectionSettings};
use futures::future::BoxFuture;
use std::sync::Arc;

/// The single remote call issued by a command
pub type RemoteCall = BoxFuture<'static, Result<CallOutcome, RemoteFault>>;

/// A command with bound parameters
///
/// Implementations only describe their parameters and the one remote call
/// they make; the dispatcher owns connection resolution, deadlines and error
/// reporting.
pub trait AdminCommand: Send + Sync {
    fn kind(&self) -> CommandKind;

    /// Validate parameters and build the request
    fn bind(&self) -> Result<CommandRequest, CommandFailure>;

    /// Connection settings supplied with the command itself
    fn explicit_connection(&self) -> Option<&ConnectionSettings> {
        None
    }

    /// Build the remote call against a resolved connection
    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall;
}

/// Reject empty names before anything is sent
pub(crate) fn require_name(argument: &str, value: &str) -> Result<(), CommandFailure> {
    if value.trim().is_empty() {
        return Err(CommandFailure::invalid_argument(argument, "must not be empty"));
    }
    Ok(())
}

/// Application names live under the `fabric:/` scheme
pub(crate) fn require_application_name(value: &str) -> Result<(), CommandFailure> {
    require_name("application_name", value)?;
    if !value.starts_with("fabric:/") || value.len() == "fabric:/".len() {
        return Err(CommandFailure::invalid_argument(
            "application_name",
            format!("'{}' is not a fabric:/ application name", value),
        ));
    }
    Ok(())
}
