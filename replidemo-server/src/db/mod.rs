//! Database layer - handles, pools and the chat store
//!
//! # Design Principles
//!
//! - One connection pool per target - no Arc<Mutex<Connection>>
//! - Routing picks a handle; the store never knows which target it is
//! - Write rejections from replicas are surfaced, never retried

pub mod handles;
pub mod memory;
pub mod pool;
pub mod schema;
pub mod store;

pub use handles::{DbHandles, Handle, PingReport};
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_from_url};
pub use store::{ChatMessage, ChatStore, PgChatStore, StoreError};

use crate::config::ReplicationConfig;
use crate::error::{Error, Result};
use crate::target::Target;

/// Create the chat table on the primary.
///
/// Opens and closes its own pool so it can run before the handles exist.
pub async fn bootstrap_schema(config: &ReplicationConfig) -> Result<()> {
    let settings = config.settings(Target::Primary)?;
    let pool = create_pool(&settings, &config.pool)
        .await
        .map_err(|source| Error::Connect {
            target: Target::Primary,
            endpoint: settings.endpoint(),
            source,
        })?;

    let result = schema::ensure_chat_table(&pool).await.map_err(Error::Schema);
    pool.close().await;
    result
}
