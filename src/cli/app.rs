// Runs one parsed command line against a session

use crate::cli::error::CliResult;
use crate::cli::Cli;
use crate::client::{ClientFactory, SimulatedCluster, SimulatedFactory, UnlinkedTransport};
use crate::dispatch::{Dispatcher, TimeoutPolicy};
use crate::logging;
use crate::output::ConsoleSink;
use crate::session::{FileSessionStore, SessionConfigStore, SessionContext};
use log::{debug, warn};
use std::process::ExitCode;
use std::sync::Arc;

/// Execute the command line and return the process exit code
///
/// 0 when the command succeeded (including warning results), 1 when it
/// ended with a terminating error. Usage and configuration problems are
/// returned as `CliError`.
pub async fn execute(cli: Cli) -> CliResult<ExitCode> {
    let Cli { global, command } = cli;
    logging::init(global.verbose);

    let store: Arc<dyn SessionConfigStore> = match &global.config {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => Arc::new(FileSessionStore::at_default_location()?),
    };
    let config = store.load().await?;

    let factory: Arc<dyn ClientFactory> = if global.simulate {
        debug!("using the simulated cluster");
        Arc::new(SimulatedFactory::new(Arc::new(SimulatedCluster::sample())))
    } else {
        Arc::new(UnlinkedTransport)
    };

    let settings = global.connection_settings()?;
    let format = global.output.unwrap_or(config.output.format);
    let sink = ConsoleSink::new(format, global.verbose > 0);

    let session = Arc::new(
        SessionContext::new(store, factory)
            .with_timeout_policy(TimeoutPolicy::from_settings(&config.timeouts)),
    );

    let abort = session.abort_token().clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; cancelling the running command");
            abort.cancel();
        }
    });

    let command = command.into_command(settings.clone(), global.timeout());
    let dispatcher = Dispatcher::new(session.clone()).with_explicit_connection(settings);
    let report = dispatcher.dispatch(command.as_ref(), &sink).await;

    interrupt.abort();
    session.close().await;

    debug!(
        "{} finished in state {:?} after {:?}",
        report.command, report.state, report.transitions
    );
    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
