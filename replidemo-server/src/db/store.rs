//! Chat store - insert and list against one database handle
//!
//! [`ChatStore`] is the seam between routing and storage. [`PgChatStore`]
//! talks to PostgreSQL through a `PgPool`; `MemoryStore` (see `memory.rs`)
//! stands in for it in tests and in the offline demo.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use crate::policy::FailurePolicy;

/// SQLSTATE `read_only_sql_transaction`, raised by hot-standby replicas on writes.
pub const READ_ONLY_SQLSTATE: &str = "25006";

const INSERT_CHAT: &str = r#"
    INSERT INTO chat (message)
    VALUES ($1)
    RETURNING id::bigint AS id, created_at::timestamptz AS created_at
"#;

const LIST_CHATS: &str = r#"
    SELECT id::bigint AS id, message, created_at::timestamptz AS created_at
    FROM chat
    ORDER BY id DESC
"#;

const COUNT_CHATS: &str = "SELECT COUNT(*) FROM chat";

/// Chat row. `id` is unique within one database only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Store error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database refused the write (read-only replica). Message is the server's, verbatim.
    #[error("{message}")]
    WriteRejected { message: String },

    /// Connection could not be established or was lost
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// A row could not be decoded (strict policy only)
    #[error("failed to decode chat row: {0}")]
    Decode(String),

    #[error("{0}")]
    Query(sqlx::Error),
}

impl StoreError {
    pub fn is_write_rejected(&self) -> bool {
        matches!(self, Self::WriteRejected { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some(READ_ONLY_SQLSTATE) {
                return Self::WriteRejected {
                    message: db.message().to_string(),
                };
            }
        }

        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(e.to_string()),
            _ => Self::Query(e),
        }
    }
}

/// Operations available against a single database handle.
///
/// Implementations must be safe for concurrent use; callers add no locking.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Check the connection with a trivial query.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Insert one row, returning it with the database-assigned id and timestamp.
    ///
    /// The text is stored verbatim.
    async fn insert(&self, message: &str) -> Result<ChatMessage, StoreError>;

    /// All rows, newest first.
    async fn list(&self, policy: FailurePolicy) -> Result<Vec<ChatMessage>, StoreError>;

    /// Number of rows in the chat table.
    async fn count(&self) -> Result<i64, StoreError>;

    /// Release the underlying connections.
    async fn close(&self);
}

/// Decode raw rows under `policy`.
///
/// Best-effort skips rows that fail to decode; strict fails on the first one.
pub fn decode_rows<R, E, F>(
    rows: impl IntoIterator<Item = R>,
    policy: FailurePolicy,
    decode: F,
) -> Result<Vec<ChatMessage>, StoreError>
where
    F: Fn(&R) -> Result<ChatMessage, E>,
    E: fmt::Display,
{
    let mut messages = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        match decode(&row) {
            Ok(message) => messages.push(message),
            Err(e) if policy.is_best_effort() => {
                skipped += 1;
                tracing::debug!(error = %e, "skipping undecodable chat row");
            }
            Err(e) => return Err(StoreError::Decode(e.to_string())),
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, kept = messages.len(), "list finished with skipped rows");
    }
    Ok(messages)
}

/// PostgreSQL-backed chat store
#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, message: &str) -> Result<ChatMessage, StoreError> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(INSERT_CHAT)
            .bind(message)
            .fetch_one(&self.pool)
            .await?;

        Ok(ChatMessage {
            id,
            message: message.to_owned(),
            created_at,
        })
    }

    async fn list(&self, policy: FailurePolicy) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = sqlx::query(LIST_CHATS).fetch_all(&self.pool).await?;
        decode_rows(rows, policy, |row: &PgRow| ChatMessage::from_row(row))
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(COUNT_CHATS)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
