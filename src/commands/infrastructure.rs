// Infrastructure service queries

use crate::client::CallOptions;
use crate::dispatch::command::require_name;
use crate::dispatch::{
    AdminCommand, CallOutcome, CommandFailure, CommandKind, CommandRequest, Payload, RemoteCall,
    TargetObject,
};
use crate::session::ClusterConnection;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

/// Send an opaque command to an infrastructure service
///
/// The reply is returned exactly as the service produced it. The call runs as
/// its own task so long queries never hold up other commands.
#[derive(Debug, Clone)]
pub struct InvokeInfrastructureQuery {
    pub service_name: String,
    pub command: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for InvokeInfrastructureQuery {
    fn kind(&self) -> CommandKind {
        CommandKind::InvokeInfrastructureQuery
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        require_name("service_name", &self.service_name)?;
        require_name("command", &self.command)?;
        Ok(
            CommandRequest::new(self.kind(), TargetObject::Service(self.service_name.clone()))
                .with_argument("service_name", self.service_name.clone())
                .with_argument("command", self.command.clone())
                .with_timeout(self.timeout),
        )
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let service_name = self.service_name.clone();
        let command = self.command.clone();
        async move {
            let reply = connection
                .client()
                .invoke_infrastructure_query(&service_name, &command, options)
                .await?;
            Ok(CallOutcome::Payload(Payload::Text(reply)))
        }
        .boxed()
    }
}
