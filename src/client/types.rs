// Data exchanged with the cluster-management endpoint

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Timestamp type
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Per-call deadline and cancellation handed to every remote operation
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Time left before the caller abandons the call
    pub timeout: Duration,
    /// Fires when the caller abandons the call
    pub cancel: CancellationToken,
}

impl CallOptions {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }
}

/// Identity of the cluster answering a connectivity test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub cluster_name: String,
    pub code_version: String,
}

/// Descriptor emitted by connect and test-connection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionDescriptor {
    pub endpoints: Vec<String>,
    pub cluster_name: String,
    pub code_version: String,
    pub security: String,
    pub connected_at: Timestamp,
}

/// Configuration of a single cluster node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfiguration {
    pub node_name: String,
    pub node_type: String,
    pub ip_address_or_fqdn: String,
    pub fault_domain: String,
    pub upgrade_domain: String,
    pub is_seed_node: bool,
}

/// Kind of overlay network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Isolated,
}

/// Lifecycle status of an overlay network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    Ready,
    Stopped,
}

/// Parameters for creating a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub network_name: String,
    pub address_prefix: String,
}

/// Network as reported by the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescription {
    pub network_name: String,
    pub network_type: NetworkType,
    pub address_prefix: String,
    pub status: NetworkStatus,
}

/// A node on which a network is deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub network_name: String,
    pub node_name: String,
}
