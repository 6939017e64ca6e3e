// In-process cluster used by `--simulate` runs and by tests
//
// State lives in memory. Each operation can be given a behavior (latency,
// injected fault, hang) to exercise timeout and cancellation paths.

use super::{
    CallOptions, ClientFactory, ClusterClient, ClusterInfo, FaultCode, NetworkDescription,
    NetworkNode, NetworkSpec, NetworkStatus, NetworkType, NodeConfiguration, RemoteFault,
};
use crate::session::ConnectionSettings;
use async_trait::async_trait;
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Remote operations exposed by the simulated cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    TestConnection,
    EnableNode,
    GetNodeConfiguration,
    ResetPartitionLoad,
    MoveNextUpgradeDomain,
    RollbackApplicationUpgrade,
    RollbackClusterUpgrade,
    SetHealthReportingVerbosity,
    InvokeInfrastructureQuery,
    CreateNetwork,
    GetNetwork,
    ListNetworks,
    RemoveNetwork,
    StartNetwork,
    StopNetwork,
    RestartNetwork,
    GetNetworkNodes,
}

/// How an operation behaves before touching cluster state
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Answer after the given latency unless the caller cancels first
    Latency(Duration),
    /// Answer after the given latency even if the caller cancelled
    IgnoreCancel(Duration),
    /// Fail with the given fault
    Fail(RemoteFault),
    /// Never answer; returns only once the caller cancels
    Hang,
}

/// Upgrade progress of an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeState {
    Idle,
    InProgress { pending_domains: Vec<String> },
    RollingBack,
}

#[derive(Debug, Clone)]
struct SimulatedNode {
    enabled: bool,
    configuration: Option<NodeConfiguration>,
}

#[derive(Debug, Default)]
struct ClusterState {
    nodes: BTreeMap<String, SimulatedNode>,
    applications: BTreeMap<String, UpgradeState>,
    cluster_upgrade: Option<UpgradeState>,
    partitions: HashMap<Uuid, u64>,
    networks: BTreeMap<String, NetworkDescription>,
    deployments: BTreeMap<String, HashSet<String>>,
    infrastructure: HashMap<String, HashMap<String, String>>,
    verbose_health_reporting: bool,
}

/// In-memory `ClusterClient`
pub struct SimulatedCluster {
    name: String,
    state: RwLock<ClusterState>,
    behaviors: RwLock<HashMap<Operation, Behavior>>,
    calls: AtomicUsize,
}

impl SimulatedCluster {
    /// Create an empty cluster
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(ClusterState::default()),
            behaviors: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Five-node demo cluster with one application mid-upgrade
    pub fn sample() -> Self {
        let mut state = ClusterState::default();
        for index in 0..5 {
            let node_name = format!("_Node_{index}");
            state.nodes.insert(
                node_name.clone(),
                SimulatedNode {
                    enabled: index != 4,
                    configuration: Some(NodeConfiguration {
                        node_name,
                        node_type: "NodeType0".to_string(),
                        ip_address_or_fqdn: format!("10.0.0.{}", index + 4),
                        fault_domain: format!("fd:/{index}"),
                        upgrade_domain: index.to_string(),
                        is_seed_node: index < 3,
                    }),
                },
            );
        }
        state.applications.insert(
            "fabric:/App1".to_string(),
            UpgradeState::InProgress {
                pending_domains: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            },
        );
        state.applications.insert("fabric:/App2".to_string(), UpgradeState::Idle);
        state.networks.insert(
            "overlay0".to_string(),
            NetworkDescription {
                network_name: "overlay0".to_string(),
                network_type: NetworkType::Isolated,
                address_prefix: "10.10.0.0/16".to_string(),
                status: NetworkStatus::Ready,
            },
        );
        state.deployments.insert(
            "overlay0".to_string(),
            ["_Node_0".to_string(), "_Node_1".to_string()].into_iter().collect(),
        );
        state.infrastructure.insert(
            "fabric:/System/InfrastructureService".to_string(),
            HashMap::from([(
                "GetJobs".to_string(),
                "{\"Jobs\":[]}".to_string(),
            )]),
        );

        Self {
            name: "SimulatedCluster".to_string(),
            state: RwLock::new(state),
            behaviors: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn add_node(&self, node_name: &str, configuration: Option<NodeConfiguration>, enabled: bool) {
        self.state.write().await.nodes.insert(
            node_name.to_string(),
            SimulatedNode {
                enabled,
                configuration,
            },
        );
    }

    pub async fn add_application(&self, application_name: &str, upgrade: UpgradeState) {
        self.state
            .write()
            .await
            .applications
            .insert(application_name.to_string(), upgrade);
    }

    pub async fn set_cluster_upgrade(&self, upgrade: Option<UpgradeState>) {
        self.state.write().await.cluster_upgrade = upgrade;
    }

    pub async fn add_partition(&self, partition_id: Uuid, load: u64) {
        self.state.write().await.partitions.insert(partition_id, load);
    }

    pub async fn add_network(&self, spec: NetworkSpec, nodes: &[&str]) {
        let mut state = self.state.write().await;
        state.deployments.insert(
            spec.network_name.clone(),
            nodes.iter().map(|n| n.to_string()).collect(),
        );
        state.networks.insert(
            spec.network_name.clone(),
            NetworkDescription {
                network_name: spec.network_name,
                network_type: NetworkType::Isolated,
                address_prefix: spec.address_prefix,
                status: NetworkStatus::Ready,
            },
        );
    }

    /// Register an infrastructure service answering `command` with `response`
    pub async fn add_infrastructure_response(&self, service_name: &str, command: &str, response: &str) {
        self.state
            .write()
            .await
            .infrastructure
            .entry(service_name.to_string())
            .or_default()
            .insert(command.to_string(), response.to_string());
    }

    /// Set the behavior of one operation
    pub async fn set_behavior(&self, operation: Operation, behavior: Behavior) {
        self.behaviors.write().await.insert(operation, behavior);
    }

    pub async fn clear_behavior(&self, operation: Operation) {
        self.behaviors.write().await.remove(&operation);
    }

    /// Number of remote calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn node_enabled(&self, node_name: &str) -> Option<bool> {
        self.state.read().await.nodes.get(node_name).map(|n| n.enabled)
    }

    pub async fn upgrade_state(&self, application_name: &str) -> Option<UpgradeState> {
        self.state.read().await.applications.get(application_name).cloned()
    }

    pub async fn cluster_upgrade(&self) -> Option<UpgradeState> {
        self.state.read().await.cluster_upgrade.clone()
    }

    pub async fn partition_load(&self, partition_id: Uuid) -> Option<u64> {
        self.state.read().await.partitions.get(&partition_id).copied()
    }

    pub async fn verbose_health_reporting(&self) -> bool {
        self.state.read().await.verbose_health_reporting
    }

    pub async fn network(&self, network_name: &str) -> Option<NetworkDescription> {
        self.state.read().await.networks.get(network_name).cloned()
    }

    /// Count the call and apply the configured behavior
    async fn enter(&self, operation: Operation, options: &CallOptions) -> Result<(), RemoteFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behaviors.read().await.get(&operation).cloned();
        debug!("simulated {:?} call (behavior: {:?})", operation, behavior);

        match behavior {
            None => Ok(()),
            Some(Behavior::Latency(latency)) => {
                tokio::select! {
                    _ = tokio::time::sleep(latency) => Ok(()),
                    _ = options.cancel.cancelled() => Err(abandoned(operation)),
                }
            }
            Some(Behavior::IgnoreCancel(latency)) => {
                tokio::time::sleep(latency).await;
                Ok(())
            }
            Some(Behavior::Fail(fault)) => Err(fault),
            Some(Behavior::Hang) => {
                options.cancel.cancelled().await;
                Err(abandoned(operation))
            }
        }
    }
}

fn abandoned(operation: Operation) -> RemoteFault {
    RemoteFault::indeterminate(format!("{:?} call abandoned by the caller", operation))
}

fn node_not_found(node_name: &str) -> RemoteFault {
    RemoteFault::fault(FaultCode::NodeNotFound, format!("Node '{}' was not found.", node_name))
}

fn application_not_found(application_name: &str) -> RemoteFault {
    RemoteFault::fault(
        FaultCode::ApplicationNotFound,
        format!("Application '{}' was not found.", application_name),
    )
}

fn network_not_found(network_name: &str) -> RemoteFault {
    RemoteFault::fault(
        FaultCode::NetworkNotFound,
        format!("Network '{}' was not found.", network_name),
    )
}

fn upgrade_not_in_progress() -> RemoteFault {
    RemoteFault::fault(FaultCode::UpgradeNotInProgress, "Upgrade not in progress")
}

#[async_trait]
impl ClusterClient for SimulatedCluster {
    async fn test_connection(&self, options: CallOptions) -> Result<ClusterInfo, RemoteFault> {
        self.enter(Operation::TestConnection, &options).await?;
        Ok(ClusterInfo {
            cluster_name: self.name.clone(),
            code_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    async fn enable_node(&self, node_name: &str, options: CallOptions) -> Result<(), RemoteFault> {
        self.enter(Operation::EnableNode, &options).await?;
        let mut state = self.state.write().await;
        let node = state
            .nodes
            .get_mut(node_name)
            .ok_or_else(|| node_not_found(node_name))?;
        node.enabled = true;
        Ok(())
    }

    async fn get_node_configuration(
        &self,
        node_name: &str,
        options: CallOptions,
    ) -> Result<Option<NodeConfiguration>, RemoteFault> {
        self.enter(Operation::GetNodeConfiguration, &options).await?;
        let state = self.state.read().await;
        match state.nodes.get(node_name) {
            Some(node) => Ok(node.configuration.clone()),
            // A node the cluster never heard of has no configuration either
            None => Ok(None),
        }
    }

    async fn reset_partition_load(&self, partition_id: Uuid, options: CallOptions) -> Result<(), RemoteFault> {
        self.enter(Operation::ResetPartitionLoad, &options).await?;
        let mut state = self.state.write().await;
        let load = state.partitions.get_mut(&partition_id).ok_or_else(|| {
            RemoteFault::fault(
                FaultCode::PartitionNotFound,
                format!("Partition '{}' was not found.", partition_id),
            )
        })?;
        *load = 0;
        Ok(())
    }

    async fn move_next_upgrade_domain(
        &self,
        application_name: &str,
        upgrade_domain: &str,
        options: CallOptions,
    ) -> Result<(), RemoteFault> {
        self.enter(Operation::MoveNextUpgradeDomain, &options).await?;
        let mut state = self.state.write().await;
        let upgrade = state
            .applications
            .get_mut(application_name)
            .ok_or_else(|| application_not_found(application_name))?;

        match upgrade {
            UpgradeState::InProgress { pending_domains } => {
                if pending_domains.first().map(String::as_str) != Some(upgrade_domain) {
                    return Err(RemoteFault::fault(
                        FaultCode::InvalidArgument,
                        format!("Upgrade domain '{}' is not the next pending domain.", upgrade_domain),
                    ));
                }
                pending_domains.remove(0);
                if pending_domains.is_empty() {
                    *upgrade = UpgradeState::Idle;
                }
                Ok(())
            }
            _ => Err(upgrade_not_in_progress()),
        }
    }

    async fn rollback_application_upgrade(
        &self,
        application_name: &str,
        options: CallOptions,
    ) -> Result<(), RemoteFault> {
        self.enter(Operation::RollbackApplicationUpgrade, &options).await?;
        let mut state = self.state.write().await;
        let upgrade = state
            .applications
            .get_mut(application_name)
            .ok_or_else(|| application_not_found(application_name))?;

        match upgrade {
            UpgradeState::InProgress { .. } => {
                *upgrade = UpgradeState::RollingBack;
                Ok(())
            }
            _ => Err(upgrade_not_in_progress()),
        }
    }

    async fn rollback_cluster_upgrade(&self, options: CallOptions) -> Result<(), RemoteFault> {
        self.enter(Operation::RollbackClusterUpgrade, &options).await?;
        let mut state = self.state.write().await;
        if !matches!(state.cluster_upgrade, Some(UpgradeState::InProgress { .. })) {
            return Err(upgrade_not_in_progress());
        }
        state.cluster_upgrade = Some(UpgradeState::RollingBack);
        Ok(())
    }

    async fn set_health_reporting_verbosity(&self, enabled: bool, options: CallOptions) -> Result<(), RemoteFault> {
        self.enter(Operation::SetHealthReportingVerbosity, &options).await?;
        self.state.write().await.verbose_health_reporting = enabled;
        Ok(())
    }

    async fn invoke_infrastructure_query(
        &self,
        service_name: &str,
        command: &str,
        options: CallOptions,
    ) -> Result<String, RemoteFault> {
        self.enter(Operation::InvokeInfrastructureQuery, &options).await?;
        let state = self.state.read().await;
        let service = state.infrastructure.get(service_name).ok_or_else(|| {
            RemoteFault::fault(
                FaultCode::ServiceNotFound,
                format!("Service '{}' was not found.", service_name),
            )
        })?;
        service.get(command).cloned().ok_or_else(|| {
            RemoteFault::fault(
                FaultCode::InvalidArgument,
                format!("Unknown infrastructure command '{}'.", command),
            )
        })
    }

    async fn create_network(&self, spec: NetworkSpec, options: CallOptions) -> Result<NetworkDescription, RemoteFault> {
        self.enter(Operation::CreateNetwork, &options).await?;
        let mut state = self.state.write().await;
        if state.networks.contains_key(&spec.network_name) {
            return Err(RemoteFault::fault(
                FaultCode::NetworkAlreadyExists,
                format!("Network '{}' already exists.", spec.network_name),
            ));
        }
        let network = NetworkDescription {
            network_name: spec.network_name.clone(),
            network_type: NetworkType::Isolated,
            address_prefix: spec.address_prefix,
            status: NetworkStatus::Ready,
        };
        state.networks.insert(spec.network_name, network.clone());
        Ok(network)
    }

    async fn get_network(&self, network_name: &str, options: CallOptions) -> Result<NetworkDescription, RemoteFault> {
        self.enter(Operation::GetNetwork, &options).await?;
        self.state
            .read()
            .await
            .networks
            .get(network_name)
            .cloned()
            .ok_or_else(|| network_not_found(network_name))
    }

    async fn list_networks(&self, options: CallOptions) -> Result<Vec<NetworkDescription>, RemoteFault> {
        self.enter(Operation::ListNetworks, &options).await?;
        Ok(self.state.read().await.networks.values().cloned().collect())
    }

    async fn remove_network(&self, network_name: &str, options: CallOptions) -> Result<(), RemoteFault> {
        self.enter(Operation::RemoveNetwork, &options).await?;
        let mut state = self.state.write().await;
        if !state.networks.contains_key(network_name) {
            return Err(network_not_found(network_name));
        }
        let in_use = state
            .deployments
            .get(network_name)
            .is_some_and(|nodes| !nodes.is_empty());
        if in_use {
            return Err(RemoteFault::fault(
                FaultCode::NetworkInUse,
                format!("Network '{}' is in use.", network_name),
            ));
        }
        state.networks.remove(network_name);
        state.deployments.remove(network_name);
        Ok(())
    }

    async fn start_network(&self, network_name: &str, options: CallOptions) -> Result<NetworkDescription, RemoteFault> {
        self.enter(Operation::StartNetwork, &options).await?;
        self.transition_network(network_name, NetworkStatus::Ready).await
    }

    async fn stop_network(&self, network_name: &str, options: CallOptions) -> Result<NetworkDescription, RemoteFault> {
        self.enter(Operation::StopNetwork, &options).await?;
        self.transition_network(network_name, NetworkStatus::Stopped).await
    }

    async fn restart_network(&self, network_name: &str, options: CallOptions) -> Result<NetworkDescription, RemoteFault> {
        self.enter(Operation::RestartNetwork, &options).await?;
        self.transition_network(network_name, NetworkStatus::Ready).await
    }

    async fn get_network_nodes(&self, network_name: &str, options: CallOptions) -> Result<Vec<NetworkNode>, RemoteFault> {
        self.enter(Operation::GetNetworkNodes, &options).await?;
        let state = self.state.read().await;
        if !state.networks.contains_key(network_name) {
            return Err(network_not_found(network_name));
        }
        let mut nodes: Vec<NetworkNode> = state
            .deployments
            .get(network_name)
            .into_iter()
            .flatten()
            .map(|node_name| NetworkNode {
                network_name: network_name.to_string(),
                node_name: node_name.clone(),
            })
            .collect();
        nodes.sort_by(|a, b| a.node_name.cmp(&b.node_name));
        Ok(nodes)
    }
}

impl SimulatedCluster {
    async fn transition_network(
        &self,
        network_name: &str,
        status: NetworkStatus,
    ) -> Result<NetworkDescription, RemoteFault> {
        let mut state = self.state.write().await;
        let network = state
            .networks
            .get_mut(network_name)
            .ok_or_else(|| network_not_found(network_name))?;
        network.status = status;
        Ok(network.clone())
    }
}

/// Factory handing out one shared `SimulatedCluster`
pub struct SimulatedFactory {
    cluster: Arc<SimulatedCluster>,
    connects: AtomicUsize,
    refuse: AtomicBool,
    connect_latency: Option<Duration>,
}

impl SimulatedFactory {
    pub fn new(cluster: Arc<SimulatedCluster>) -> Self {
        Self {
            cluster,
            connects: AtomicUsize::new(0),
            refuse: AtomicBool::new(false),
            connect_latency: None,
        }
    }

    /// Delay each connection attempt
    pub fn with_connect_latency(mut self, latency: Duration) -> Self {
        self.connect_latency = Some(latency);
        self
    }

    /// Make subsequent connection attempts fail
    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Number of clients constructed so far
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn cluster(&self) -> &Arc<SimulatedCluster> {
        &self.cluster
    }
}

#[async_trait]
impl ClientFactory for SimulatedFactory {
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn ClusterClient>, RemoteFault> {
        if let Some(latency) = self.connect_latency {
            tokio::time::sleep(latency).await;
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(RemoteFault::transport(format!(
                "connection refused by {}",
                settings.endpoints.join(", ")
            )));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        debug!("simulated client connected to {:?}", settings.endpoints);
        let client: Arc<dyn ClusterClient> = self.cluster.clone();
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    fn options() -> CallOptions {
        CallOptions::new(Duration::from_secs(60), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_resume_walks_pending_domains() {
        let cluster = SimulatedCluster::new("test");
        cluster
            .add_application(
                "fabric:/App1",
                UpgradeState::InProgress {
                    pending_domains: vec!["UD1".to_string(), "UD2".to_string()],
                },
            )
            .await;

        let err = cluster
            .move_next_upgrade_domain("fabric:/App1", "UD2", options())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(FaultCode::InvalidArgument));

        cluster.move_next_upgrade_domain("fabric:/App1", "UD1", options()).await.unwrap();
        cluster.move_next_upgrade_domain("fabric:/App1", "UD2", options()).await.unwrap();
        assert_eq!(cluster.upgrade_state("fabric:/App1").await, Some(UpgradeState::Idle));

        let err = cluster
            .move_next_upgrade_domain("fabric:/App1", "UD3", options())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Upgrade not in progress");
    }

    #[tokio::test]
    async fn test_remove_network_in_use() {
        let cluster = SimulatedCluster::new("test");
        let spec = NetworkSpec {
            network_name: "net1".to_string(),
            address_prefix: "10.0.0.0/24".to_string(),
        };
        cluster.add_network(spec, &["_Node_0"]).await;

        let err = cluster.remove_network("net1", options()).await.unwrap_err();
        assert_eq!(err.code(), Some(FaultCode::NetworkInUse));
        assert!(cluster.network("net1").await.is_some());
    }

    #[tokio::test]
    async fn test_hang_returns_after_cancel() {
        let cluster = SimulatedCluster::new("test");
        cluster.set_behavior(Operation::TestConnection, Behavior::Hang).await;

        let options = options();
        let token = options.cancel.clone();
        let call = tokio::spawn(async move { cluster.test_connection(options).await });
        token.cancel();

        let result = call.await.unwrap();
        assert!(matches!(result, Err(RemoteFault::Indeterminate { .. })));
    }

    #[tokio::test]
    async fn test_factory_refuses() {
        let factory = SimulatedFactory::new(Arc::new(SimulatedCluster::new("test")));
        factory.set_refuse(true);
        let settings = ConnectionSettings::new(vec!["localhost:19000".to_string()]);

        let result = factory.connect(&settings).await;
        assert!(matches!(result, Err(RemoteFault::Transport { .. })));
        assert_eq!(factory.connect_count(), 0);
    }
}
