// Command descriptors
//
// Every administrative command is described by a `CommandKind`. Its
// capabilities, timeout class, invocation shape and error contract are
// looked up here instead of being inherited from a base type.

use crate::dispatch::translator::ErrorContract;
use serde::{Serialize, Serializer};
use std::fmt;

/// Every command the dispatcher knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CommandKind {
    ConnectCluster,
    TestConnection,
    EnableNode,
    GetNodeConfiguration,
    ResetPartitionLoad,
    ResumeApplicationUpgrade,
    RollbackApplicationUpgrade,
    RollbackClusterUpgrade,
    ToggleHealthReportingVerbosity,
    InvokeInfrastructureQuery,
    CreateNetwork,
    GetNetwork,
    ListNetworks,
    RemoveNetwork,
    StartNetwork,
    StopNetwork,
    RestartNetwork,
    GetNetworkOnNode,
}

/// What a command does to the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ReadOnly,
    Mutating,
    /// Mutates through an opaque multi-step request
    MultiStep,
}

/// Which default timeout applies when the operator gives none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    Standard,
    LongRunning,
}

/// How the remote call is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationShape {
    /// Driven inline on the command's task
    Synchronous,
    /// Spawned as its own task; the command suspends until it is observed
    Awaited,
}

/// Requirements a command places on the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Runs on the session connection; without it the command needs explicit settings
    pub requires_cluster_connection: bool,
    /// Needs an application name target
    pub requires_application_context: bool,
    /// Needs a network name target
    pub requires_network_context: bool,
    /// Drops the cached connection and resolves a new one
    pub fresh_connection: bool,
    /// Builds its own connection and makes it the session connection
    pub establishes_session: bool,
}

impl Capabilities {
    const CLUSTER: Self = Self {
        requires_cluster_connection: true,
        requires_application_context: false,
        requires_network_context: false,
        fresh_connection: false,
        establishes_session: false,
    };

    const APPLICATION: Self = Self {
        requires_application_context: true,
        ..Self::CLUSTER
    };

    const NETWORK: Self = Self {
        requires_network_context: true,
        ..Self::CLUSTER
    };
}

/// Stable identifier attached to terminating errors of decorated commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorId {
    EnableNode,
    ResetPartitionLoad,
    ResumeApplicationUpgrade,
    RollbackApplicationUpgrade,
    RollbackClusterUpgrade,
    SetHealthReportingVerbosity,
    InvokeInfrastructureQuery,
    NewNetwork,
    RemoveNetwork,
    StartNetwork,
    StopNetwork,
    RestartNetwork,
}

impl ErrorId {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorId::EnableNode => "EnableNodeErrorId",
            ErrorId::ResetPartitionLoad => "ResetPartitionLoadErrorId",
            ErrorId::ResumeApplicationUpgrade => "ResumeApplicationUpgradeErrorId",
            ErrorId::RollbackApplicationUpgrade => "RollbackApplicationUpgradeErrorId",
            ErrorId::RollbackClusterUpgrade => "RollbackClusterUpgradeErrorId",
            ErrorId::SetHealthReportingVerbosity => "SetHealthReportingVerbosityErrorId",
            ErrorId::InvokeInfrastructureQuery => "InvokeInfrastructureQueryErrorId",
            ErrorId::NewNetwork => "NewNetworkErrorId",
            ErrorId::RemoveNetwork => "RemoveNetworkErrorId",
            ErrorId::StartNetwork => "StartNetworkErrorId",
            ErrorId::StopNetwork => "StopNetworkErrorId",
            ErrorId::RestartNetwork => "RestartNetworkErrorId",
        }
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl CommandKind {
    pub const ALL: [CommandKind; 18] = [
        CommandKind::ConnectCluster,
        CommandKind::TestConnection,
        CommandKind::EnableNode,
        CommandKind::GetNodeConfiguration,
        CommandKind::ResetPartitionLoad,
        CommandKind::ResumeApplicationUpgrade,
        CommandKind::RollbackApplicationUpgrade,
        CommandKind::RollbackClusterUpgrade,
        CommandKind::ToggleHealthReportingVerbosity,
        CommandKind::InvokeInfrastructureQuery,
        CommandKind::CreateNetwork,
        CommandKind::GetNetwork,
        CommandKind::ListNetworks,
        CommandKind::RemoveNetwork,
        CommandKind::StartNetwork,
        CommandKind::StopNetwork,
        CommandKind::RestartNetwork,
        CommandKind::GetNetworkOnNode,
    ];

    /// Operator-facing command name
    pub const fn name(self) -> &'static str {
        match self {
            CommandKind::ConnectCluster => "connect",
            CommandKind::TestConnection => "test-connection",
            CommandKind::EnableNode => "enable-node",
            CommandKind::GetNodeConfiguration => "get-node-configuration",
            CommandKind::ResetPartitionLoad => "reset-partition-load",
            CommandKind::ResumeApplicationUpgrade => "resume-application-upgrade",
            CommandKind::RollbackApplicationUpgrade => "rollback-application-upgrade",
            CommandKind::RollbackClusterUpgrade => "rollback-cluster-upgrade",
            CommandKind::ToggleHealthReportingVerbosity => "set-health-reporting-verbosity",
            CommandKind::InvokeInfrastructureQuery => "invoke-infrastructure-query",
            CommandKind::CreateNetwork => "network new",
            CommandKind::GetNetwork => "network get",
            CommandKind::ListNetworks => "network list",
            CommandKind::RemoveNetwork => "network remove",
            CommandKind::StartNetwork => "network start",
            CommandKind::StopNetwork => "network stop",
            CommandKind::RestartNetwork => "network restart",
            CommandKind::GetNetworkOnNode => "network nodes",
        }
    }

    pub const fn capabilities(self) -> Capabilities {
        match self {
            CommandKind::ConnectCluster => Capabilities {
                requires_cluster_connection: false,
                establishes_session: true,
                ..Capabilities::CLUSTER
            },
            CommandKind::TestConnection => Capabilities {
                fresh_connection: true,
                ..Capabilities::CLUSTER
            },
            CommandKind::ResumeApplicationUpgrade | CommandKind::RollbackApplicationUpgrade => {
                Capabilities::APPLICATION
            }
            CommandKind::CreateNetwork
            | CommandKind::GetNetwork
            | CommandKind::RemoveNetwork
            | CommandKind::StartNetwork
            | CommandKind::StopNetwork
            | CommandKind::RestartNetwork
            | CommandKind::GetNetworkOnNode => Capabilities::NETWORK,
            _ => Capabilities::CLUSTER,
        }
    }

    pub const fn effect(self) -> Effect {
        match self {
            CommandKind::ConnectCluster
            | CommandKind::TestConnection
            | CommandKind::GetNodeConfiguration
            | CommandKind::GetNetwork
            | CommandKind::ListNetworks
            | CommandKind::GetNetworkOnNode => Effect::ReadOnly,
            CommandKind::InvokeInfrastructureQuery => Effect::MultiStep,
            _ => Effect::Mutating,
        }
    }

    pub const fn timeout_class(self) -> TimeoutClass {
        match self {
            CommandKind::ResumeApplicationUpgrade
            | CommandKind::RollbackApplicationUpgrade
            | CommandKind::RollbackClusterUpgrade
            | CommandKind::InvokeInfrastructureQuery => TimeoutClass::LongRunning,
            _ => TimeoutClass::Standard,
        }
    }

    pub const fn invocation_shape(self) -> InvocationShape {
        match self {
            CommandKind::InvokeInfrastructureQuery => InvocationShape::Awaited,
            _ => InvocationShape::Synchronous,
        }
    }

    pub const fn error_id(self) -> Option<ErrorId> {
        match self {
            CommandKind::EnableNode => Some(ErrorId::EnableNode),
            CommandKind::ResetPartitionLoad => Some(ErrorId::ResetPartitionLoad),
            CommandKind::ResumeApplicationUpgrade => Some(ErrorId::ResumeApplicationUpgrade),
            CommandKind::RollbackApplicationUpgrade => Some(ErrorId::RollbackApplicationUpgrade),
            CommandKind::RollbackClusterUpgrade => Some(ErrorId::RollbackClusterUpgrade),
            CommandKind::ToggleHealthReportingVerbosity => Some(ErrorId::SetHealthReportingVerbosity),
            CommandKind::InvokeInfrastructureQuery => Some(ErrorId::InvokeInfrastructureQuery),
            CommandKind::CreateNetwork => Some(ErrorId::NewNetwork),
            CommandKind::RemoveNetwork => Some(ErrorId::RemoveNetwork),
            CommandKind::StartNetwork => Some(ErrorId::StartNetwork),
            CommandKind::StopNetwork => Some(ErrorId::StopNetwork),
            CommandKind::RestartNetwork => Some(ErrorId::RestartNetwork),
            _ => None,
        }
    }

    /// How failures of this command are presented
    pub const fn error_contract(self) -> ErrorContract {
        match (self.effect(), self.error_id()) {
            (Effect::ReadOnly, _) | (_, None) => ErrorContract::Raw,
            (_, Some(id)) => ErrorContract::Decorated(id),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Mutating and multi-step commands must carry an error identifier.
const _: () = {
    let mut i = 0;
    while i < CommandKind::ALL.len() {
        let kind = CommandKind::ALL[i];
        if !matches!(kind.effect(), Effect::ReadOnly) {
            assert!(kind.error_id().is_some(), "command without an error identifier");
        }
        i += 1;
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decorated_commands() {
        for kind in CommandKind::ALL {
            match kind.error_contract() {
                ErrorContract::Decorated(id) => {
                    assert_ne!(kind.effect(), Effect::ReadOnly);
                    assert!(id.as_str().ends_with("ErrorId"));
                }
                ErrorContract::Raw => assert_eq!(kind.effect(), Effect::ReadOnly, "{kind}"),
            }
        }
    }

    #[test]
    fn test_error_id_strings() {
        assert_eq!(
            CommandKind::RollbackApplicationUpgrade.error_id().map(ErrorId::as_str),
            Some("RollbackApplicationUpgradeErrorId")
        );
        assert_eq!(
            CommandKind::ToggleHealthReportingVerbosity.error_id().map(ErrorId::as_str),
            Some("SetHealthReportingVerbosityErrorId")
        );
        assert_eq!(CommandKind::CreateNetwork.error_id(), Some(ErrorId::NewNetwork));
        assert_eq!(CommandKind::GetNetwork.error_id(), None);
        assert_eq!(
            serde_json::to_string(&ErrorId::StopNetwork).unwrap(),
            "\"StopNetworkErrorId\""
        );
    }

    #[test]
    fn test_capabilities() {
        let connect = CommandKind::ConnectCluster.capabilities();
        assert!(!connect.requires_cluster_connection);
        assert!(connect.establishes_session);

        assert!(CommandKind::TestConnection.capabilities().fresh_connection);
        assert!(CommandKind::RollbackApplicationUpgrade.capabilities().requires_application_context);
        assert!(CommandKind::RemoveNetwork.capabilities().requires_network_context);
        assert!(!CommandKind::ListNetworks.capabilities().requires_network_context);
    }

    #[test]
    fn test_long_running_and_awaited() {
        assert_eq!(
            CommandKind::InvokeInfrastructureQuery.invocation_shape(),
            InvocationShape::Awaited
        );
        assert_eq!(
            CommandKind::InvokeInfrastructureQuery.timeout_class(),
            TimeoutClass::LongRunning
        );
        assert_eq!(CommandKind::EnableNode.timeout_class(), TimeoutClass::Standard);
        assert_eq!(CommandKind::EnableNode.invocation_shape(), InvocationShape::Synchronous);
    }
}
