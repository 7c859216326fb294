//! replidemo-server: PostgreSQL replication demo over HTTP
//!
//! Routes chat writes and reads to the primary, the replica or a pooling
//! proxy (PgCat) according to a per-request token, and compares row counts
//! across all three to show replication lag.

pub mod compare;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod policy;
pub mod target;

pub use compare::{compare, CompareError, Comparison, TargetCount};
pub use config::{ConfigError, ReplicationConfig};
pub use db::{ChatMessage, ChatStore, DbHandles, StoreError};
pub use error::{Error, Result};
pub use policy::FailurePolicy;
pub use target::{Resolved, Target};
