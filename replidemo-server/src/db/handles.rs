//! The fixed set of database handles
//!
//! Three handles, one per [`Target`], opened at startup and shared by every
//! request. Each handle wraps an `Arc<dyn ChatStore>`; concurrency is the
//! store's business (a `PgPool` for real databases).

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use super::memory::MemoryStore;
use super::pool::create_pool;
use super::store::{ChatStore, PgChatStore};
use crate::config::ReplicationConfig;
use crate::error::{Error, Result};
use crate::target::Target;

/// One named database endpoint
#[derive(Clone)]
pub struct Handle {
    target: Target,
    endpoint: String,
    store: Arc<dyn ChatStore>,
}

impl Handle {
    pub fn new(target: Target, endpoint: impl Into<String>, store: Arc<dyn ChatStore>) -> Self {
        Self {
            target,
            endpoint: endpoint.into(),
            store,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// `host:port`, never credentials
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn store(&self) -> &dyn ChatStore {
        self.store.as_ref()
    }
}

/// Result of pinging one handle
#[derive(Debug, Clone, Serialize)]
pub struct PingReport {
    pub target: Target,
    pub endpoint: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Primary, replica and proxy handles
#[derive(Clone)]
pub struct DbHandles {
    primary: Handle,
    replica: Handle,
    proxy: Handle,
}

impl DbHandles {
    /// Build from already-open stores.
    pub fn new(primary: Handle, replica: Handle, proxy: Handle) -> Self {
        Self {
            primary,
            replica,
            proxy,
        }
    }

    /// Open a pool per target and ping each one.
    ///
    /// Any failure is fatal: the demo does not start with a missing handle.
    pub async fn connect(config: &ReplicationConfig) -> Result<Self> {
        let primary = connect_handle(config, Target::Primary).await?;
        let replica = connect_handle(config, Target::Replica).await?;
        let proxy = connect_handle(config, Target::Proxy).await?;
        let handles = Self::new(primary, replica, proxy);

        for handle in handles.iter() {
            handle
                .store()
                .ping()
                .await
                .map_err(|source| Error::Ping {
                    target: handle.target(),
                    endpoint: handle.endpoint().to_string(),
                    source,
                })?;
            tracing::info!(db = %handle.target(), endpoint = %handle.endpoint(), "connected");
        }

        tracing::info!("Connected to all databases");
        Ok(handles)
    }

    /// Demo handles backed by one in-memory table.
    ///
    /// The replica is a read-only view that sees every primary write at once.
    pub fn in_memory() -> Self {
        let primary = MemoryStore::new();
        let replica = primary.view().read_only();
        let proxy = primary.view();

        Self::new(
            Handle::new(Target::Primary, "memory", Arc::new(primary)),
            Handle::new(Target::Replica, "memory", Arc::new(replica)),
            Handle::new(Target::Proxy, "memory", Arc::new(proxy)),
        )
    }

    pub fn get(&self, target: Target) -> &Handle {
        match target {
            Target::Primary => &self.primary,
            Target::Replica => &self.replica,
            Target::Proxy => &self.proxy,
        }
    }

    /// Handles in [`Target::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        Target::ALL.into_iter().map(move |target| self.get(target))
    }

    /// Ping every handle concurrently.
    pub async fn ping_all(&self) -> Vec<PingReport> {
        join_all(self.iter().map(|handle| async move {
            let result = handle.store().ping().await;
            PingReport {
                target: handle.target(),
                endpoint: handle.endpoint().to_string(),
                ok: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            }
        }))
        .await
    }

    /// Close every pool. Called once at shutdown.
    pub async fn close(&self) {
        for handle in self.iter() {
            handle.store().close().await;
        }
        tracing::info!("Database handles closed");
    }
}

async fn connect_handle(config: &ReplicationConfig, target: Target) -> Result<Handle> {
    let settings = config.settings(target)?;
    let endpoint = settings.endpoint();

    let pool = create_pool(&settings, &config.pool)
        .await
        .map_err(|source| Error::Connect {
            target,
            endpoint: endpoint.clone(),
            source,
        })?;

    Ok(Handle::new(target, endpoint, Arc::new(PgChatStore::new(pool))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_handles() -> (DbHandles, [Arc<MemoryStore>; 3]) {
        let primary = Arc::new(MemoryStore::new());
        let replica = Arc::new(MemoryStore::new());
        let proxy = Arc::new(MemoryStore::new());
        let handles = DbHandles::new(
            Handle::new(Target::Primary, "primary:5432", primary.clone()),
            Handle::new(Target::Replica, "replica:5433", replica.clone()),
            Handle::new(Target::Proxy, "pgcat:6432", proxy.clone()),
        );
        (handles, [primary, replica, proxy])
    }

    #[test]
    fn get_maps_every_target() {
        let (handles, _) = memory_handles();
        for target in Target::ALL {
            assert_eq!(handles.get(target).target(), target);
        }
        assert_eq!(handles.get(Target::Replica).endpoint(), "replica:5433");
    }

    #[test]
    fn iter_is_in_fixed_order() {
        let (handles, _) = memory_handles();
        let order: Vec<Target> = handles.iter().map(Handle::target).collect();
        assert_eq!(order, Target::ALL.to_vec());
    }

    #[tokio::test]
    async fn ping_all_reports_each_handle() {
        let (handles, [_, replica, _]) = memory_handles();
        replica.set_unreachable(true);

        let reports = handles.ping_all().await;
        assert_eq!(reports.len(), 3);
        assert!(reports[0].ok);
        assert!(!reports[1].ok);
        assert!(reports[1].error.is_some());
        assert!(reports[2].ok);
    }

    #[tokio::test]
    async fn in_memory_replica_rejects_writes_and_sees_primary_rows() {
        let handles = DbHandles::in_memory();

        handles.get(Target::Primary).store().insert("hello").await.unwrap();
        let err = handles
            .get(Target::Replica)
            .store()
            .insert("nope")
            .await
            .unwrap_err();
        assert!(err.is_write_rejected());

        for handle in handles.iter() {
            assert_eq!(handle.store().count().await.unwrap(), 1);
        }
    }
}
