// Cluster-management client interface
//
// The wire protocol lives behind these traits. The dispatch layer only ever
// sees `ClusterClient` handles produced by a `ClientFactory`.

pub mod fault;
pub mod simulated;
pub mod types;

pub use fault::{FaultCode, RemoteFault};
pub use simulated::{Behavior, Operation, SimulatedCluster, SimulatedFactory, UpgradeState};
pub use types::*;

use crate::session::ConnectionSettings;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Remote cluster-management operations
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Check that the endpoint answers and report its identity
    async fn test_connection(&self, options: CallOptions) -> Result<ClusterInfo, RemoteFault>;

    /// Re-enable a previously disabled node
    async fn enable_node(&self, node_name: &str, options: CallOptions) -> Result<(), RemoteFault>;

    /// Read a node's configuration; `None` when the node is not configured
    async fn get_node_configuration(
        &self,
        node_name: &str,
        options: CallOptions,
    ) -> Result<Option<NodeConfiguration>, RemoteFault>;

    /// Reset the reported load of a partition
    async fn reset_partition_load(
        &self,
        partition_id: Uuid,
        options: CallOptions,
    ) -> Result<(), RemoteFault>;

    /// Resume a monitored application upgrade in the given upgrade domain
    async fn move_next_upgrade_domain(
        &self,
        application_name: &str,
        upgrade_domain: &str,
        options: CallOptions,
    ) -> Result<(), RemoteFault>;

    /// Roll back an in-progress application upgrade
    async fn rollback_application_upgrade(
        &self,
        application_name: &str,
        options: CallOptions,
    ) -> Result<(), RemoteFault>;

    /// Roll back an in-progress cluster upgrade
    async fn rollback_cluster_upgrade(&self, options: CallOptions) -> Result<(), RemoteFault>;

    /// Switch verbose health reporting on or off
    async fn set_health_reporting_verbosity(
        &self,
        enabled: bool,
        options: CallOptions,
    ) -> Result<(), RemoteFault>;

    /// Forward an opaque command to an infrastructure service
    async fn invoke_infrastructure_query(
        &self,
        service_name: &str,
        command: &str,
        options: CallOptions,
    ) -> Result<String, RemoteFault>;

    async fn create_network(
        &self,
        spec: NetworkSpec,
        options: CallOptions,
    ) -> Result<NetworkDescription, RemoteFault>;

    async fn get_network(
        &self,
        network_name: &str,
        options: CallOptions,
    ) -> Result<NetworkDescription, RemoteFault>;

    async fn list_networks(&self, options: CallOptions) -> Result<Vec<NetworkDescription>, RemoteFault>;

    async fn remove_network(&self, network_name: &str, options: CallOptions) -> Result<(), RemoteFault>;

    async fn start_network(
        &self,
        network_name: &str,
        options: CallOptions,
    ) -> Result<NetworkDescription, RemoteFault>;

    async fn stop_network(
        &self,
        network_name: &str,
        options: CallOptions,
    ) -> Result<NetworkDescription, RemoteFault>;

    async fn restart_network(
        &self,
        network_name: &str,
        options: CallOptions,
    ) -> Result<NetworkDescription, RemoteFault>;

    /// Nodes on which a network is deployed
    async fn get_network_nodes(
        &self,
        network_name: &str,
        options: CallOptions,
    ) -> Result<Vec<NetworkNode>, RemoteFault>;
}

/// Builds client handles from connection settings
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn ClusterClient>, RemoteFault>;
}

/// Factory used when no transport is linked into the build
pub struct UnlinkedTransport;

#[async_trait]
impl ClientFactory for UnlinkedTransport {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn ClusterClient>, RemoteFault> {
        Err(RemoteFault::transport(format!(
            "no cluster transport is available for {}; rerun with --simulate to use the in-process cluster",
            settings.endpoints.join(", ")
        )))
    }
}
