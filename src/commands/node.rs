// Node commands

use super::acknowledged;
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

/// Warning emitted when a node has no configuration to report
pub const NODE_NOT_CONFIGURED: &str = "Node is not configured.";

/// Re-enable a disabled node
#[derive(Debug, Clone)]
pub struct EnableNode {
    pub node_name: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for EnableNode {
    fn kind(&self) -> CommandKind {
        CommandKind::EnableNode
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        require_name("node_name", &self.node_name)?;
        Ok(
            CommandRequest::new(self.kind(), TargetObject::Node(self.node_name.clone()))
                .with_argument("node_name", self.node_name.clone())
                .with_timeout(self.timeout),
        )
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let node_name = self.node_name.clone();
        let kind = self.kind();
        async move {
            connection.client().enable_node(&node_name, options).await?;
            Ok(acknowledged(kind, TargetObject::Node(node_name)))
        }
        .boxed()
    }
}

/// Read the configuration of a node
#[derive(Debug, Clone)]
pub struct GetNodeConfiguration {
    pub node_name: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for GetNodeConfiguration {
    fn kind(&self) -> CommandKind {
        CommandKind::GetNodeConfiguration
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        require_name("node_name", &self.node_name)?;
        Ok(
            CommandRequest::new(self.kind(), TargetObject::Node(self.node_name.clone()))
                .with_argument("node_name", self.node_name.clone())
                .with_timeout(self.timeout),
        )
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let node_name = self.node_name.clone();
        async move {
            match connection.client().get_node_configuration(&node_name, options).await? {
                Some(configuration) => Ok(CallOutcome::Payload(Payload::NodeConfiguration(configuration))),
                None => Ok(CallOutcome::empty(NODE_NOT_CONFIGURED)),
            }
        }
        .boxed()
    }
}
