// Session context: the cluster connection, its configuration store, and the
// abort signal shared by every command execution in one session.

pub mod config;
pub mod connection;
pub mod resolver;

pub use config::{
    ConfigError, ConfigResult, FileSessionStore, MemorySessionStore, OutputSettings, SessionConfig,
    SessionConfigStore, TimeoutSettings,
};
pub use connection::{ClusterConnection, ConnectionSettings, ConnectionState, Credential};
pub use resolver::ConnectionResolver;

use crate::client::ClientFactory;
use crate::dispatch::timeout::TimeoutPolicy;
use log::info;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State owned by one administrative session
///
/// Created at session start and passed explicitly to the dispatcher. Closing
/// the session aborts in-flight calls and drops the cached connection.
pub struct SessionContext {
    resolver: ConnectionResolver,
    store: Arc<dyn SessionConfigStore>,
    timeouts: TimeoutPolicy,
    abort: CancellationToken,
}

impl SessionContext {
    /// Create a session with default timeouts
    pub fn new(store: Arc<dyn SessionConfigStore>, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            resolver: ConnectionResolver::new(store.clone(), factory),
            store,
            timeouts: TimeoutPolicy::default(),
            abort: CancellationToken::new(),
        }
    }

    /// Create a session whose timeouts come from the stored configuration
    pub async fn open(
        store: Arc<dyn SessionConfigStore>,
        factory: Arc<dyn ClientFactory>,
    ) -> ConfigResult<Self> {
        let config = store.load().await?;
        let session = Self::new(store, factory).with_timeout_policy(TimeoutPolicy::from_settings(&config.timeouts));
        info!("session opened (timeouts: {:?})", session.timeouts);
        Ok(session)
    }

    pub fn with_timeout_policy(mut self, timeouts: TimeoutPolicy) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn resolver(&self) -> &ConnectionResolver {
        &self.resolver
    }

    pub fn store(&self) -> &Arc<dyn SessionConfigStore> {
        &self.store
    }

    pub fn timeout_policy(&self) -> &TimeoutPolicy {
        &self.timeouts
    }

    /// Parent of every call's cancellation signal
    pub fn abort_token(&self) -> &CancellationToken {
        &self.abort
    }

    /// Cancel every in-flight call of this session
    pub fn abort(&self) {
        self.abort.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }

    /// End the session
    pub async fn close(&self) {
        self.abort.cancel();
        self.resolver.invalidate().await;
        info!("session closed");
    }
}
