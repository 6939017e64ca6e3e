// Health reporting commands

use super::acknowledged;
use crate::client::CallOptions;
use crate::dispatch::{AdminCommand, CommandFailure, CommandKind, CommandRequest, RemoteCall, TargetObject};
use crate::session::ClusterConnection;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

/// Switch verbose cluster health reporting on or off
#[derive(Debug, Clone)]
pub struct SetHealthReportingVerbosity {
    pub enabled: bool,
    pub timeout: Option<Duration>,
}

impl AdminCommand for SetHealthReportingVerbosity {
    fn kind(&self) -> CommandKind {
        CommandKind::ToggleHealthReportingVerbosity
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        Ok(CommandRequest::new(self.kind(), TargetObject::Cluster)
            .with_argument("enabled", self.enabled)
            .with_timeout(self.timeout))
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let enabled = self.enabled;
        let kind = self.kind();
        async move {
            connection
                .client()
                .set_health_reporting_verbosity(enabled, options)
                .await?;
            Ok(acknowledged(kind, TargetObject::Cluster))
        }
        .boxed()
    }
}
