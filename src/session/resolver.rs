// Connection resolution and the session's cached connection slot

use crate::client::ClientFactory;
use crate::dispatch::error::CommandFailure;
use crate::dispatch::translator::Redactor;
use crate::session::config::SessionConfigStore;
use crate::session::connection::{ClusterConnection, ConnectionSettings, ConnectionState};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Contents of the cached connection slot
enum ConnectionSlot {
    Unresolved,
    Resolved(Arc<ClusterConnection>),
    Failed { reason: String },
}

/// Obtains cluster connections and caches the ambient one
///
/// The slot is the only mutable state shared between command executions.
/// It is guarded by one async mutex that stays held while a connection is
/// being built, so concurrent executions never construct two clients.
pub struct ConnectionResolver {
    store: Arc<dyn SessionConfigStore>,
    factory: Arc<dyn ClientFactory>,
    slot: Mutex<ConnectionSlot>,
}

impl ConnectionResolver {
    pub fn new(store: Arc<dyn SessionConfigStore>, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            store,
            factory,
            slot: Mutex::new(ConnectionSlot::Unresolved),
        }
    }

    /// Resolve a connection
    ///
    /// Explicit settings always produce a fresh connection that is not cached.
    /// Without them the cached session connection is returned, building it from
    /// the session store when the slot is empty or failed.
    pub async fn resolve(
        &self,
        explicit: Option<&ConnectionSettings>,
    ) -> Result<Arc<ClusterConnection>, CommandFailure> {
        if let Some(settings) = explicit {
            debug!("resolving explicit connection to {:?}", settings.endpoints);
            return self.build(settings.clone()).await;
        }

        let mut slot = self.slot.lock().await;
        if let ConnectionSlot::Resolved(connection) = &*slot {
            if connection.state() == ConnectionState::Resolved {
                return Ok(connection.clone());
            }
            debug!("cached connection {} is marked failed; re-resolving", connection.id());
        }
        self.resolve_ambient(&mut slot).await
    }

    /// Drop the cached connection and resolve the ambient one again
    pub async fn refresh(&self) -> Result<Arc<ClusterConnection>, CommandFailure> {
        let mut slot = self.slot.lock().await;
        *slot = ConnectionSlot::Unresolved;
        self.resolve_ambient(&mut slot).await
    }

    /// Make `connection` the session connection
    pub async fn adopt(&self, connection: Arc<ClusterConnection>) {
        info!("session connection set to {:?}", connection.endpoints());
        *self.slot.lock().await = ConnectionSlot::Resolved(connection);
    }

    /// Flag the cached connection failed if it is the one with `id`
    pub async fn mark_failed(&self, id: Uuid) {
        if let ConnectionSlot::Resolved(connection) = &*self.slot.lock().await {
            if connection.id() == id {
                warn!("connection {} observed a transport fault; it will be re-resolved", id);
                connection.mark_failed();
            }
        }
    }

    /// Forget the cached connection
    pub async fn invalidate(&self) {
        *self.slot.lock().await = ConnectionSlot::Unresolved;
    }

    /// Cached connection, if one is resolved
    pub async fn current(&self) -> Option<Arc<ClusterConnection>> {
        match &*self.slot.lock().await {
            ConnectionSlot::Resolved(connection) => Some(connection.clone()),
            _ => None,
        }
    }

    /// State of the cached slot
    pub async fn state(&self) -> ConnectionState {
        match &*self.slot.lock().await {
            ConnectionSlot::Unresolved => ConnectionState::Unresolved,
            ConnectionSlot::Resolved(connection) => connection.state(),
            ConnectionSlot::Failed { .. } => ConnectionState::Failed,
        }
    }

    async fn resolve_ambient(
        &self,
        slot: &mut ConnectionSlot,
    ) -> Result<Arc<ClusterConnection>, CommandFailure> {
        let config = self.store.load().await.map_err(|e| {
            CommandFailure::connection_unavailable(format!(
                "Session configuration could not be loaded: {}",
                e
            ))
        })?;

        let Some(settings) = config.connection else {
            return Err(CommandFailure::connection_unavailable(
                "No cluster connection is configured. Run `clusteradm connect` or pass --endpoint.",
            ));
        };

        match self.build(settings).await {
            Ok(connection) => {
                info!(
                    "resolved session connection {} to {:?}",
                    connection.id(),
                    connection.endpoints()
                );
                *slot = ConnectionSlot::Resolved(connection.clone());
                Ok(connection)
            }
            Err(failure) => {
                warn!("session connection could not be resolved: {}", failure);
                *slot = ConnectionSlot::Failed {
                    reason: failure.to_string(),
                };
                Err(failure)
            }
        }
    }

    async fn build(&self, settings: ConnectionSettings) -> Result<Arc<ClusterConnection>, CommandFailure> {
        settings
            .validate()
            .map_err(|e| CommandFailure::connection_unavailable(e.to_string()))?;

        let client = self.factory.connect(&settings).await.map_err(|fault| {
            let redactor = Redactor::from_credential(&settings.credential);
            CommandFailure::connection_unavailable(format!(
                "Failed to connect to {}: {}",
                settings.endpoints.join(", "),
                redactor.redact(fault.message())
            ))
        })?;

        Ok(Arc::new(ClusterConnection::new(settings, client)))
    }
}

impl std::fmt::Debug for ConnectionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionSlot::Unresolved => f.write_str("Unresolved"),
            ConnectionSlot::Resolved(connection) => write!(f, "Resolved({})", connection.id()),
            ConnectionSlot::Failed { reason } => write!(f, "Failed({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{SimulatedCluster, SimulatedFactory};
    use crate::dispatch::error::FailureKind;
    use crate::session::config::MemorySessionStore;

    fn settings() -> ConnectionSettings {
        ConnectionSettings::new(vec!["localhost:19000".to_string()])
    }

    #[tokio::test]
    async fn test_failed_slot_is_rebuilt() {
        let factory = Arc::new(SimulatedFactory::new(Arc::new(SimulatedCluster::new("test"))));
        let store = Arc::new(MemorySessionStore::with_connection(settings()));
        let resolver = ConnectionResolver::new(store, factory.clone());

        factory.set_refuse(true);
        let failure = resolver.resolve(None).await.unwrap_err();
        assert_eq!(failure.kind(), FailureKind::ConnectionUnavailable);
        assert_eq!(resolver.state().await, ConnectionState::Failed);

        factory.set_refuse(false);
        let connection = resolver.resolve(None).await.unwrap();
        assert_eq!(connection.state(), ConnectionState::Resolved);
        assert_eq!(factory.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_marked_failed_connection_is_replaced() {
        let factory = Arc::new(SimulatedFactory::new(Arc::new(SimulatedCluster::new("test"))));
        let store = Arc::new(MemorySessionStore::with_connection(settings()));
        let resolver = ConnectionResolver::new(store, factory.clone());

        let first = resolver.resolve(None).await.unwrap();
        first.mark_failed();
        let second = resolver.resolve(None).await.unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(factory.connect_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_explicit_endpoint() {
        let factory = Arc::new(SimulatedFactory::new(Arc::new(SimulatedCluster::new("test"))));
        let resolver = ConnectionResolver::new(Arc::new(MemorySessionStore::new()), factory.clone());

        let explicit = ConnectionSettings::new(vec!["no-port".to_string()]);
        let failure = resolver.resolve(Some(&explicit)).await.unwrap_err();
        assert_eq!(failure.kind(), FailureKind::ConnectionUnavailable);
        assert_eq!(factory.connect_count(), 0);
    }
}
