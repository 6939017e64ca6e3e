// Uniform command lifecycle: bind, resolve, invoke, report

use crate::dispatch::command::AdminCommand;
use crate::dispatch::descriptor::{Capabilities, CommandKind};
use crate::dispatch::error::CommandFailure;
use crate::dispatch::invoker::CommandInvoker;
use crate::dispatch::lifecycle::ExecutionState;
use crate::dispatch::translator::{ErrorTranslator, Redactor};
use crate::dispatch::types::{CallOutcome, CommandRequest, CommandResult, TargetObject};
use crate::output::{Emission, OutputSink};
use crate::session::{ClusterConnection, ConnectionSettings, SessionContext};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Record of one command execution
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub request_id: Option<Uuid>,
    pub command: CommandKind,
    pub state: ExecutionState,
    /// Every state the execution passed through, starting at `Created`
    pub transitions: Vec<ExecutionState>,
    pub emission: Emission,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.state == ExecutionState::Succeeded
    }
}

/// Tracks the lifecycle of one execution
struct Execution {
    kind: CommandKind,
    state: ExecutionState,
    transitions: Vec<ExecutionState>,
}

impl Execution {
    fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            state: ExecutionState::Created,
            transitions: vec![ExecutionState::Created],
        }
    }

    fn advance(&mut self, next: ExecutionState) {
        match self.state.advance(next) {
            Ok(()) => {
                debug!("{}: -> {:?}", self.kind, next);
                self.transitions.push(next);
            }
            Err(e) => warn!("{}: {}", self.kind, e),
        }
    }
}

/// Runs administrative commands within one session
pub struct Dispatcher {
    session: Arc<SessionContext>,
    invoker: CommandInvoker,
    explicit: Option<ConnectionSettings>,
}

impl Dispatcher {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self {
            session,
            invoker: CommandInvoker::new(),
            explicit: None,
        }
    }

    /// Use these settings instead of the session connection
    pub fn with_explicit_connection(mut self, settings: Option<ConnectionSettings>) -> Self {
        self.explicit = settings;
        self
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Run one command and report its outcome to `sink`
    ///
    /// Exactly one emission is produced per execution.
    pub async fn dispatch(&self, command: &dyn AdminCommand, sink: &dyn OutputSink) -> ExecutionReport {
        let kind = command.kind();
        let mut execution = Execution::new(kind);

        let request = match command.bind().and_then(|request| Self::check_context(kind, request)) {
            Ok(request) => request,
            Err(failure) => {
                return self.fail(execution, None, failure, ErrorTranslator::default(), sink);
            }
        };
        let request_id = request.request_id();
        execution.advance(ExecutionState::ParametersBound);

        let explicit = command.explicit_connection().or(self.explicit.as_ref());
        let resolved = tokio::select! {
            biased;
            _ = self.session.abort_token().cancelled() => Err(CommandFailure::Cancelled),
            result = self.resolve(kind.capabilities(), explicit) => result,
        };
        let connection = match resolved {
            Ok(connection) => connection,
            Err(failure) => {
                let translator = ErrorTranslator::new(explicit.map_or_else(Redactor::new, |settings| {
                    Redactor::from_credential(&settings.credential)
                }));
                return self.fail(execution, Some(request_id), failure, translator, sink);
            }
        };
        execution.advance(ExecutionState::ConnectionResolved);
        sink.verbose(&format!(
            "Using cluster connection to {}",
            connection.endpoints().join(", ")
        ));

        let deadline = self.session.timeout_policy().derive(
            request.timeout(),
            kind.timeout_class(),
            self.session.abort_token(),
        );
        let call = command.call(connection.clone(), deadline.call_options());
        execution.advance(ExecutionState::Invoked);
        sink.verbose(&format!(
            "Invoking {} on {} with timeout {:?}",
            kind,
            request.target(),
            deadline.timeout()
        ));

        let result = self
            .invoker
            .invoke(request, &deadline, kind.invocation_shape(), call)
            .await;

        match result {
            CommandResult::Succeeded(outcome) => {
                if kind.capabilities().establishes_session {
                    self.establish(&connection, sink).await;
                }
                execution.advance(ExecutionState::Succeeded);
                let emission = match outcome {
                    CallOutcome::Payload(payload) => Emission::Result(payload),
                    CallOutcome::Empty { warning } => Emission::Warning(warning),
                };
                sink.emit(&emission);
                ExecutionReport {
                    request_id: Some(request_id),
                    command: kind,
                    state: execution.state,
                    transitions: execution.transitions,
                    emission,
                }
            }
            CommandResult::Failed(failure) => {
                if let CommandFailure::Remote(fault) = &failure {
                    if fault.is_transport() {
                        self.session.resolver().mark_failed(connection.id()).await;
                    }
                }
                let translator = ErrorTranslator::new(Redactor::for_connection(&connection));
                self.fail(execution, Some(request_id), failure, translator, sink)
            }
        }
    }

    /// Reject requests whose target does not match the command's context
    fn check_context(kind: CommandKind, request: CommandRequest) -> Result<CommandRequest, CommandFailure> {
        let capabilities = kind.capabilities();

        if request.timeout() == Some(Duration::ZERO) {
            return Err(CommandFailure::invalid_argument(
                "timeout",
                "must be greater than zero",
            ));
        }
        if capabilities.requires_application_context
            && !matches!(request.target(), TargetObject::Application(_))
        {
            return Err(CommandFailure::invalid_argument(
                "application_name",
                format!("{} requires an application target", kind),
            ));
        }
        if capabilities.requires_network_context && !matches!(request.target(), TargetObject::Network(_)) {
            return Err(CommandFailure::invalid_argument(
                "network_name",
                format!("{} requires a network target", kind),
            ));
        }
        Ok(request)
    }

    async fn resolve(
        &self,
        capabilities: Capabilities,
        explicit: Option<&ConnectionSettings>,
    ) -> Result<Arc<ClusterConnection>, CommandFailure> {
        let resolver = self.session.resolver();

        if !capabilities.requires_cluster_connection {
            // the session connection is neither used nor touched
            let settings = explicit.ok_or_else(|| {
                CommandFailure::connection_unavailable(
                    "No cluster endpoint was given. Pass --endpoint <host:port>.",
                )
            })?;
            return resolver.resolve(Some(settings)).await;
        }
        if capabilities.fresh_connection && explicit.is_none() {
            return resolver.refresh().await;
        }
        resolver.resolve(explicit).await
    }

    /// Make a verified connection the session connection and persist it
    async fn establish(&self, connection: &Arc<ClusterConnection>, sink: &dyn OutputSink) {
        self.session.resolver().adopt(connection.clone()).await;

        let store = self.session.store();
        let saved = match store.load().await {
            Ok(mut config) => {
                config.connection = Some(connection.settings().clone());
                store.save(&config).await
            }
            Err(e) => Err(e),
        };
        match saved {
            Ok(()) => info!("saved session connection to {:?}", connection.endpoints()),
            Err(e) => {
                warn!("session connection was not saved: {}", e);
                sink.verbose(&format!("Session connection was not saved: {}", e));
            }
        }
    }

    fn fail(
        &self,
        mut execution: Execution,
        request_id: Option<Uuid>,
        failure: CommandFailure,
        translator: ErrorTranslator,
        sink: &dyn OutputSink,
    ) -> ExecutionReport {
        execution.advance(ExecutionState::for_failure(failure.kind()));
        let error = translator.translate(&failure, execution.kind.error_contract());
        warn!(
            "{} failed ({}): {}",
            execution.kind,
            error.kind,
            error.message
        );

        let emission = Emission::Terminating(error);
        sink.emit(&emission);
        ExecutionReport {
            request_id,
            command: execution.kind,
            state: execution.state,
            transitions: execution.transitions,
            emission,
        }
    }
}
