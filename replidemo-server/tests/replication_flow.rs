//! End-to-end flows over the public API with in-memory handles

use std::sync::Arc;

use replidemo_server::db::{Handle, MemoryStore};
use replidemo_server::{compare, ChatStore, DbHandles, FailurePolicy, Target};

struct Cluster {
    primary: Arc<MemoryStore>,
    replica: Arc<MemoryStore>,
    handles: DbHandles,
}

/// Primary and proxy share rows; the replica is a separate read-only store
/// that only changes when `replicate` copies rows across.
fn cluster() -> Cluster {
    let primary = Arc::new(MemoryStore::new());
    let proxy = Arc::new(primary.view());
    let replica = Arc::new(MemoryStore::new().read_only());
    let handles = DbHandles::new(
        Handle::new(Target::Primary, "primary:5432", primary.clone()),
        Handle::new(Target::Replica, "replica:5433", replica.clone()),
        Handle::new(Target::Proxy, "pgcat:6432", proxy),
    );
    Cluster {
        primary,
        replica,
        handles,
    }
}

impl Cluster {
    async fn replicate(&self) {
        let behind = self.primary.count().await.unwrap() - self.replica.count().await.unwrap();
        self.replica.seed(behind.max(0) as usize);
    }
}

#[tokio::test]
async fn lag_then_catch_up() {
    let cluster = cluster();
    let handles = &cluster.handles;

    for text in ["one", "two", "three"] {
        handles
            .get(Target::resolve(Some("master")).target)
            .store()
            .insert(text)
            .await
            .unwrap();
    }

    let before = compare(handles, FailurePolicy::BestEffort).await.unwrap();
    assert_eq!(before.count(Target::Primary), 3);
    assert_eq!(before.count(Target::Proxy), 3);
    assert_eq!(before.count(Target::Replica), 0);
    assert!(!before.is_match());

    cluster.replicate().await;

    let after = compare(handles, FailurePolicy::BestEffort).await.unwrap();
    assert!(after.is_match());
}

#[tokio::test]
async fn replica_write_is_rejected_and_visible_state_unchanged() {
    let cluster = cluster();
    let replica = cluster.handles.get(Target::Replica);

    let err = replica.store().insert("hello").await.unwrap_err();
    assert!(err.is_write_rejected());
    assert!(replica
        .store()
        .list(FailurePolicy::BestEffort)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn ids_are_per_database() {
    let cluster = cluster();
    cluster.replica.seed(10);
    cluster.replica.set_read_only(false);

    let on_primary = cluster
        .handles
        .get(Target::Primary)
        .store()
        .insert("x")
        .await
        .unwrap();
    let on_replica = cluster
        .handles
        .get(Target::Replica)
        .store()
        .insert("x")
        .await
        .unwrap();

    assert_eq!(on_primary.id, 1);
    assert_eq!(on_replica.id, 11);
}

#[tokio::test]
async fn concurrent_inserts_and_compares_do_not_block() {
    let cluster = cluster();
    let handles = cluster.handles.clone();

    let writers: Vec<_> = (0..20)
        .map(|i| {
            let handles = handles.clone();
            tokio::spawn(async move {
                handles
                    .get(Target::Primary)
                    .store()
                    .insert(&format!("message {}", i))
                    .await
                    .map(|m| m.id)
            })
        })
        .collect();
    let readers: Vec<_> = (0..5)
        .map(|_| {
            let handles = handles.clone();
            tokio::spawn(async move { compare(&handles, FailurePolicy::BestEffort).await })
        })
        .collect();

    let mut ids = Vec::new();
    for writer in writers {
        ids.push(writer.await.unwrap().unwrap());
    }
    for reader in readers {
        assert!(reader.await.unwrap().is_ok());
    }

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);

    let listed = handles
        .get(Target::Primary)
        .store()
        .list(FailurePolicy::BestEffort)
        .await
        .unwrap();
    assert_eq!(listed.len(), 20);
    assert!(listed.windows(2).all(|w| w[0].id > w[1].id));
}
