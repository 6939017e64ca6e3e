// connect and test-connection

use crate::client::CallOptions;
use crate::dispatch::{
    AdminCommand, CallOutcome, CommandFailure, CommandKind, CommandRequest, Payload, RemoteCall,
    TargetObject,
};
use crate::session::{ClusterConnection, ConnectionSettings};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

/// Ask the cluster who it is and describe the connection
fn describe(connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
    async move {
        let info = connection.client().test_connection(options).await?;
        Ok(CallOutcome::Payload(Payload::Connection(connection.descriptor(info))))
    }
    .boxed()
}

/// Establish the session connection
///
/// Builds a connection from explicit settings, verifies it, and makes it the
/// connection later commands in the session reuse.
#[derive(Debug, Clone, Default)]
pub struct ConnectCluster {
    pub settings: Option<ConnectionSettings>,
    pub timeout: Option<Duration>,
}

impl AdminCommand for ConnectCluster {
    fn kind(&self) -> CommandKind {
        CommandKind::ConnectCluster
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        let mut request =
            CommandRequest::new(self.kind(), TargetObject::Cluster).with_timeout(self.timeout);
        if let Some(settings) = &self.settings {
            settings
                .validate()
                .map_err(|e| CommandFailure::invalid_argument("endpoint", e.to_string()))?;
            request = request
                .with_argument("endpoints", settings.endpoints.clone())
                .with_argument("security", settings.credential.label());
        }
        Ok(request)
    }

    fn explicit_connection(&self) -> Option<&ConnectionSettings> {
        self.settings.as_ref()
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        describe(connection, options)
    }
}

/// Check connectivity on a freshly resolved connection
#[derive(Debug, Clone, Default)]
pub struct TestConnection {
    pub timeout: Option<Duration>,
}

impl AdminCommand for TestConnection {
    fn kind(&self) -> CommandKind {
        CommandKind::TestConnection
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        Ok(CommandRequest::new(self.kind(), TargetObject::Cluster).with_timeout(self.timeout))
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        describe(connection, options)
    }
}
