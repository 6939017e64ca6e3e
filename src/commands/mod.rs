// Administrative commands
//
// Each command is a set of bound parameters plus the one remote call it
// issues. Everything else is handled by the dispatcher.

pub mod connection;
pub mod health;
pub mod infrastructure;
pub mod network;
pub mod node;
pub mod partition;
pub mod upgrade;

pub use connection::{ConnectCluster, TestConnection};
pub use health::SetHealthReportingVerbosity;
pub use infrastructure::InvokeInfrastructureQuery;
pub use network::{
    CreateNetwork, GetNetwork, GetNetworkOnNode, ListNetworks, NetworkAction, NetworkLifecycle,
    RemoveNetwork,
};
pub use node::{EnableNode, GetNodeConfiguration};
pub use partition::ResetPartitionLoad;
pub use upgrade::{ResumeApplicationUpgrade, RollbackApplicationUpgrade, RollbackClusterUpgrade};

use crate::dispatch::{Acknowledgement, CallOutcome, CommandKind, Payload, TargetObject};

/// Outcome of a call that returns nothing but succeeded
fn acknowledged(kind: CommandKind, target: TargetObject) -> CallOutcome {
    CallOutcome::Payload(Payload::Acknowledged(Acknowledgement {
        command: kind.name().to_string(),
        target,
    }))
}
