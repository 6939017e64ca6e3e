// Overlay network commands

use super::acknowledged;
use crate::client::{CallOptions, NetworkSpec};
use crate::dispatch::command::require_name;
use crate::dispatch::{
    AdminCommand, CallOutcome, CommandFailure, CommandKind, CommandRequest, Payload, RemoteCall,
    TargetObject,
};
use crate::session::ClusterConnection;
use futures::FutureExt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

fn network_request(kind: CommandKind, network_name: &str, timeout: Option<Duration>) -> Result<CommandRequest, CommandFailure> {
    require_name("network_name", network_name)?;
    Ok(
        CommandRequest::new(kind, TargetObject::Network(network_name.to_string()))
            .with_argument("network_name", network_name)
            .with_timeout(timeout),
    )
}

/// Check an IPv4 CIDR prefix such as `10.0.0.0/16`
fn validate_address_prefix(prefix: &str) -> Result<(), CommandFailure> {
    let invalid = || {
        CommandFailure::invalid_argument(
            "address_prefix",
            format!("'{}' is not an IPv4 CIDR prefix", prefix),
        )
    };
    let (address, length) = prefix.split_once('/').ok_or_else(invalid)?;
    address.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    match length.parse::<u8>() {
        Ok(bits) if bits <= 32 => Ok(()),
        _ => Err(invalid()),
    }
}

/// Create an isolated network
#[derive(Debug, Clone)]
pub struct CreateNetwork {
    pub network_name: String,
    pub address_prefix: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for CreateNetwork {
    fn kind(&self) -> CommandKind {
        CommandKind::CreateNetwork
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        validate_address_prefix(&self.address_prefix)?;
        Ok(network_request(self.kind(), &self.network_name, self.timeout)?
            .with_argument("address_prefix", self.address_prefix.clone()))
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let spec = NetworkSpec {
            network_name: self.network_name.clone(),
            address_prefix: self.address_prefix.clone(),
        };
        async move {
            let network = connection.client().create_network(spec, options).await?;
            Ok(CallOutcome::Payload(Payload::Network(network)))
        }
        .boxed()
    }
}

#[derive(Debug, Clone)]
pub struct GetNetwork {
    pub network_name: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for GetNetwork {
    fn kind(&self) -> CommandKind {
        CommandKind::GetNetwork
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        network_request(self.kind(), &self.network_name, self.timeout)
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let network_name = self.network_name.clone();
        async move {
            let network = connection.client().get_network(&network_name, options).await?;
            Ok(CallOutcome::Payload(Payload::Network(network)))
        }
        .boxed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListNetworks {
    pub timeout: Option<Duration>,
}

impl AdminCommand for ListNetworks {
    fn kind(&self) -> CommandKind {
        CommandKind::ListNetworks
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        Ok(CommandRequest::new(self.kind(), TargetObject::Cluster).with_timeout(self.timeout))
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        async move {
            let networks = connection.client().list_networks(options).await?;
            Ok(CallOutcome::Payload(Payload::Networks(networks)))
        }
        .boxed()
    }
}

/// Delete a network that is no longer deployed on any node
#[derive(Debug, Clone)]
pub struct RemoveNetwork {
    pub network_name: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for RemoveNetwork {
    fn kind(&self) -> CommandKind {
        CommandKind::RemoveNetwork
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        network_request(self.kind(), &self.network_name, self.timeout)
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let network_name = self.network_name.clone();
        let kind = self.kind();
        async move {
            connection.client().remove_network(&network_name, options).await?;
            Ok(acknowledged(kind, TargetObject::Network(network_name)))
        }
        .boxed()
    }
}

/// Lifecycle transition applied by [`NetworkLifecycle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkAction {
    Start,
    Stop,
    Restart,
}

/// Start, stop or restart a network
#[derive(Debug, Clone)]
pub struct NetworkLifecycle {
    pub network_name: String,
    pub action: NetworkAction,
    pub timeout: Option<Duration>,
}

impl AdminCommand for NetworkLifecycle {
    fn kind(&self) -> CommandKind {
        match self.action {
            NetworkAction::Start => CommandKind::StartNetwork,
            NetworkAction::Stop => CommandKind::StopNetwork,
            NetworkAction::Restart => CommandKind::RestartNetwork,
        }
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        network_request(self.kind(), &self.network_name, self.timeout)
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let network_name = self.network_name.clone();
        let action = self.action;
        async move {
            let client = connection.client();
            let network = match action {
                NetworkAction::Start => client.start_network(&network_name, options).await?,
                NetworkAction::Stop => client.stop_network(&network_name, options).await?,
                NetworkAction::Restart => client.restart_network(&network_name, options).await?,
            };
            Ok(CallOutcome::Payload(Payload::Network(network)))
        }
        .boxed()
    }
}

/// List the nodes a network is deployed on
#[derive(Debug, Clone)]
pub struct GetNetworkOnNode {
    pub network_name: String,
    pub timeout: Option<Duration>,
}

impl AdminCommand for GetNetworkOnNode {
    fn kind(&self) -> CommandKind {
        CommandKind::GetNetworkOnNode
    }

    fn bind(&self) -> Result<CommandRequest, CommandFailure> {
        network_request(self.kind(), &self.network_name, self.timeout)
    }

    fn call(&self, connection: Arc<ClusterConnection>, options: CallOptions) -> RemoteCall {
        let network_name = self.network_name.clone();
        async move {
            let nodes = connection.client().get_network_nodes(&network_name, options).await?;
            Ok(CallOutcome::Payload(Payload::NetworkNodes(nodes)))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::FailureKind;

    #[test]
    fn test_address_prefix_validation() {
        assert!(validate_address_prefix("10.0.0.0/16").is_ok());
        for bad in ["10.0.0.0", "10.0.0/16", "10.0.0.0/33", "fd00::/8"] {
            let err = validate_address_prefix(bad).unwrap_err();
            assert_eq!(err.kind(), FailureKind::InvalidArgument, "{bad}");
        }
    }

    #[test]
    fn test_lifecycle_kinds() {
        let command = NetworkLifecycle {
            network_name: "overlay0".to_string(),
            action: NetworkAction::Restart,
            timeout: None,
        };
        assert_eq!(command.kind(), CommandKind::RestartNetwork);
        let request = command.bind().unwrap();
        assert_eq!(request.target(), &TargetObject::Network("overlay0".to_string()));
    }

    #[test]
    fn test_empty_network_name_rejected() {
        let command = RemoveNetwork {
            network_name: String::new(),
            timeout: None,
        };
        assert_eq!(command.bind().unwrap_err().kind(), FailureKind::InvalidArgument);
    }
}
