// Cluster connection handle and the settings it is built from

use crate::client::{ClusterClient, ClusterInfo, ConnectionDescriptor};
use crate::session::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use uuid::Uuid;

/// Credential presented to the cluster endpoint
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    #[default]
    None,
    Certificate {
        thumbprint: String,
        server_common_name: String,
    },
    Token {
        token: String,
    },
}

impl Credential {
    /// Values that must never appear in operator-facing text
    pub fn secrets(&self) -> Vec<&str> {
        match self {
            Credential::None => Vec::new(),
            Credential::Certificate { thumbprint, .. } => vec![thumbprint.as_str()],
            Credential::Token { token } => vec![token.as_str()],
        }
    }

    /// Short label safe for display
    pub fn label(&self) -> &'static str {
        match self {
            Credential::None => "none",
            Credential::Certificate { .. } => "certificate",
            Credential::Token { .. } => "token",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::None => f.write_str("None"),
            Credential::Certificate {
                server_common_name, ..
            } => f
                .debug_struct("Certificate")
                .field("thumbprint", &"<redacted>")
                .field("server_common_name", server_common_name)
                .finish(),
            Credential::Token { .. } => f.debug_struct("Token").field("token", &"<redacted>").finish(),
        }
    }
}

/// Endpoints and credential describing how to reach a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub credential: Credential,
}

impl ConnectionSettings {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            credential: Credential::None,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    /// Check that every endpoint is a `host:port` pair
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: String::new(),
                reason: "at least one endpoint is required".to_string(),
            });
        }

        for endpoint in &self.endpoints {
            let invalid = |reason: &str| ConfigError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: reason.to_string(),
            };
            let (host, port) = endpoint
                .rsplit_once(':')
                .ok_or_else(|| invalid("expected host:port"))?;
            if host.is_empty() {
                return Err(invalid("host is empty"));
            }
            match port.parse::<u16>() {
                Ok(0) | Err(_) => return Err(invalid("port must be between 1 and 65535")),
                Ok(_) => {}
            }
        }

        Ok(())
    }
}

/// Resolution state of a cluster connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unresolved,
    Resolved,
    Failed,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Resolved,
            2 => ConnectionState::Failed,
            _ => ConnectionState::Unresolved,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Unresolved => 0,
            ConnectionState::Resolved => 1,
            ConnectionState::Failed => 2,
        }
    }
}

/// Resolved handle to a cluster-management endpoint
pub struct ClusterConnection {
    id: Uuid,
    settings: ConnectionSettings,
    client: Arc<dyn ClusterClient>,
    state: AtomicU8,
}

impl ClusterConnection {
    pub fn new(settings: ConnectionSettings, client: Arc<dyn ClusterClient>) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings,
            client,
            state: AtomicU8::new(ConnectionState::Resolved.as_u8()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn endpoints(&self) -> &[String] {
        &self.settings.endpoints
    }

    /// Client handle for issuing remote calls
    pub fn client(&self) -> Arc<dyn ClusterClient> {
        self.client.clone()
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Flag the connection unusable; the next resolution builds a new one
    pub fn mark_failed(&self) {
        self.state.store(ConnectionState::Failed.as_u8(), Ordering::SeqCst);
    }

    /// Operator-facing description of this connection
    pub fn descriptor(&self, info: ClusterInfo) -> ConnectionDescriptor {
        ConnectionDescriptor {
            endpoints: self.settings.endpoints.clone(),
            cluster_name: info.cluster_name,
            code_version: info.code_version,
            security: self.settings.credential.label().to_string(),
            connected_at: chrono::Utc::now(),
        }
    }
}

impl fmt::Debug for ClusterConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConnection")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoints() {
        let settings = ConnectionSettings::new(vec!["cluster.local:19000".to_string()]);
        assert!(settings.validate().is_ok());

        for bad in ["cluster.local", ":19000", "cluster.local:0", "cluster.local:http"] {
            let settings = ConnectionSettings::new(vec![bad.to_string()]);
            assert!(settings.validate().is_err(), "{bad} should be rejected");
        }

        assert!(ConnectionSettings::new(Vec::new()).validate().is_err());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::Token {
            token: "s3cr3t-token".to_string(),
        };
        let rendered = format!("{:?}", credential);
        assert!(!rendered.contains("s3cr3t-token"));
        assert_eq!(credential.secrets(), vec!["s3cr3t-token"]);
        assert_eq!(credential.label(), "token");
    }
}
