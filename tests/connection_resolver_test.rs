// Connection resolution and caching tests

use clusteradm::client::{SimulatedCluster, SimulatedFactory};
use clusteradm::dispatch::FailureKind;
use clusteradm::session::{
    ConnectionResolver, ConnectionSettings, ConnectionState, MemorySessionStore, SessionContext,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

fn settings() -> ConnectionSettings {
    ConnectionSettings::new(vec!["cluster.local:19000".to_string()])
}

fn factory() -> Arc<SimulatedFactory> {
    Arc::new(SimulatedFactory::new(Arc::new(SimulatedCluster::sample())))
}

#[tokio::test]
async fn test_no_ambient_configuration() {
    let factory = factory();
    let resolver = ConnectionResolver::new(Arc::new(MemorySessionStore::new()), factory.clone());

    let failure = resolver.resolve(None).await.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::ConnectionUnavailable);
    assert_eq!(factory.connect_count(), 0);
    assert_eq!(factory.cluster().call_count(), 0);
    assert_eq!(resolver.state().await, ConnectionState::Unresolved);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_resolution_constructs_once() {
    let factory = Arc::new(
        SimulatedFactory::new(Arc::new(SimulatedCluster::sample()))
            .with_connect_latency(Duration::from_millis(50)),
    );
    let session = Arc::new(SessionContext::new(
        Arc::new(MemorySessionStore::with_connection(settings())),
        factory.clone(),
    ));

    let tasks = (0..16).map(|_| {
        let session = session.clone();
        tokio::spawn(async move { session.resolver().resolve(None).await })
    });
    let connections: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(factory.connect_count(), 1);
    let first = &connections[0];
    assert!(connections.iter().all(|c| Arc::ptr_eq(c, first)));
    assert_eq!(first.state(), ConnectionState::Resolved);
}

#[tokio::test]
async fn test_explicit_settings_bypass_cache() {
    let factory = factory();
    let resolver = ConnectionResolver::new(
        Arc::new(MemorySessionStore::with_connection(settings())),
        factory.clone(),
    );

    let cached = resolver.resolve(None).await.unwrap();
    let explicit = ConnectionSettings::new(vec!["other.local:19000".to_string()]);
    let one = resolver.resolve(Some(&explicit)).await.unwrap();
    let two = resolver.resolve(Some(&explicit)).await.unwrap();

    assert!(!Arc::ptr_eq(&one, &two));
    assert_eq!(one.endpoints(), ["other.local:19000".to_string()]);
    assert!(Arc::ptr_eq(&resolver.current().await.unwrap(), &cached));
    assert_eq!(factory.connect_count(), 3);
}

#[tokio::test]
async fn test_refresh_replaces_cached_connection() {
    let factory = factory();
    let resolver = ConnectionResolver::new(
        Arc::new(MemorySessionStore::with_connection(settings())),
        factory.clone(),
    );

    let before = resolver.resolve(None).await.unwrap();
    let after = resolver.refresh().await.unwrap();
    assert_ne!(before.id(), after.id());
    assert!(Arc::ptr_eq(&resolver.resolve(None).await.unwrap(), &after));
}

#[tokio::test]
async fn test_mark_failed_only_matches_cached_id() {
    let factory = factory();
    let resolver = ConnectionResolver::new(
        Arc::new(MemorySessionStore::with_connection(settings())),
        factory.clone(),
    );

    let cached = resolver.resolve(None).await.unwrap();
    resolver.mark_failed(uuid::Uuid::new_v4()).await;
    assert_eq!(resolver.state().await, ConnectionState::Resolved);

    resolver.mark_failed(cached.id()).await;
    assert_eq!(resolver.state().await, ConnectionState::Failed);
    assert_eq!(cached.state(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_session_close_clears_connection() {
    let session = SessionContext::new(
        Arc::new(MemorySessionStore::with_connection(settings())),
        factory(),
    );
    session.resolver().resolve(None).await.unwrap();

    session.close().await;
    assert!(session.is_aborted());
    assert_eq!(session.resolver().state().await, ConnectionState::Unresolved);
}
