// Session configuration file tests

use clusteradm::client::{SimulatedCluster, SimulatedFactory};
use clusteradm::dispatch::{TimeoutClass, TimeoutPolicy};
use clusteradm::output::OutputFormat;
use clusteradm::session::{
    ConfigError, ConnectionSettings, Credential, FileSessionStore, SessionConfig,
    SessionConfigStore, SessionContext, TimeoutSettings,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("session.toml"));

    let config = store.load().await.unwrap();
    assert_eq!(config, SessionConfig::default());
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("nested").join("session.toml"));

    let config = SessionConfig {
        connection: Some(
            ConnectionSettings::new(vec!["cluster.example.com:19000".to_string()]).with_credential(
                Credential::Certificate {
                    thumbprint: "AB12CD".to_string(),
                    server_common_name: "cluster.example.com".to_string(),
                },
            ),
        ),
        timeouts: TimeoutSettings {
            default_secs: 45,
            long_running_secs: 600,
        },
        ..SessionConfig::default()
    };
    store.save(&config).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, config);
    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("kind = \"certificate\""));
}

#[tokio::test]
async fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.toml");
    std::fs::write(&path, "[connection\nendpoints = 3").unwrap();

    let result = FileSessionStore::new(&path).load().await;
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[tokio::test]
async fn test_invalid_endpoint_in_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.toml");
    std::fs::write(&path, "[connection]\nendpoints = [\"no-port\"]\n").unwrap();

    let result = FileSessionStore::new(&path).load().await;
    assert!(matches!(result, Err(ConfigError::InvalidEndpoint { .. })));
}

#[tokio::test]
async fn test_session_uses_configured_timeouts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.toml");
    std::fs::write(&path, "[timeouts]\ndefault_secs = 15\n\n[output]\nformat = \"json\"\n").unwrap();

    let store = Arc::new(FileSessionStore::new(&path));
    let config = store.load().await.unwrap();
    assert_eq!(config.output.format, OutputFormat::Json);

    let factory = Arc::new(SimulatedFactory::new(Arc::new(SimulatedCluster::new("test"))));
    let session = SessionContext::open(store, factory).await.unwrap();
    assert_eq!(
        *session.timeout_policy(),
        TimeoutPolicy::new(Duration::from_secs(15), Duration::from_secs(300))
    );
    assert_eq!(
        session.timeout_policy().timeout_for(TimeoutClass::LongRunning),
        Duration::from_secs(300)
    );
}
