// Command dispatch: descriptors, deadlines, invocation and error translation

pub mod command;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod invoker;
pub mod lifecycle;
pub mod timeout;
pub mod translator;
pub mod types;

pub use command::{AdminCommand, RemoteCall};
pub use descriptor::{Capabilities, CommandKind, Effect, ErrorId, InvocationShape, TimeoutClass};
pub use dispatcher::{Dispatcher, ExecutionReport};
pub use error::{CommandFailure, FailureKind, TerminatingError};
pub use invoker::CommandInvoker;
pub use lifecycle::{ExecutionState, InvalidTransition};
pub use timeout::{OperationDeadline, TimeoutPolicy};
pub use translator::{ErrorContract, ErrorTranslator, Redactor};
pub use types::{Acknowledgement, CallOutcome, CommandRequest, CommandResult, Payload, TargetObject};
