//! In-memory chat store
//!
//! Behaves like one PostgreSQL database for tests and for `serve --memory`.
//! Views created with [`MemoryStore::view`] share rows but carry their own
//! read-only and reachability switches, which is enough to imitate a
//! replica that is instantly in sync.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::store::{decode_rows, ChatMessage, ChatStore, StoreError};
use crate::policy::FailurePolicy;

/// Message PostgreSQL returns when a hot standby is asked to write.
pub const READ_ONLY_MESSAGE: &str = "cannot execute INSERT in a read-only transaction";

/// Stored row. `message` is `None` for deliberately malformed rows.
#[derive(Debug, Clone)]
struct StoredRow {
    id: i64,
    message: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<StoredRow>,
    next_id: i64,
}

impl Table {
    fn push(&mut self, message: Option<String>) -> StoredRow {
        self.next_id += 1;
        let row = StoredRow {
            id: self.next_id,
            message,
            created_at: Utc::now(),
        };
        self.rows.push(row.clone());
        row
    }
}

/// In-memory chat store
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
    read_only: AtomicBool,
    unreachable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store over the same rows with its own switches (all off).
    pub fn view(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            read_only: AtomicBool::new(false),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Builder form of [`set_read_only`](Self::set_read_only).
    pub fn read_only(self) -> Self {
        self.set_read_only(true);
        self
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Make every call fail as if the server were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Insert `n` rows directly, bypassing the read-only switch.
    pub fn seed(&self, n: usize) {
        let mut table = self.lock();
        for i in 0..n {
            table.push(Some(format!("seed {}", i + 1)));
        }
    }

    /// Insert a row whose message is NULL, which fails to decode.
    pub fn seed_malformed(&self) {
        self.lock().push(None);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

fn decode(row: &StoredRow) -> Result<ChatMessage, String> {
    let message = row
        .message
        .clone()
        .ok_or_else(|| format!("unexpected NULL in column \"message\" of row {}", row.id))?;
    Ok(ChatMessage {
        id: row.id,
        message,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reachable()
    }

    async fn insert(&self, message: &str) -> Result<ChatMessage, StoreError> {
        self.check_reachable()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::WriteRejected {
                message: READ_ONLY_MESSAGE.to_string(),
            });
        }

        let row = self.lock().push(Some(message.to_owned()));
        Ok(ChatMessage {
            id: row.id,
            message: message.to_owned(),
            created_at: row.created_at,
        })
    }

    async fn list(&self, policy: FailurePolicy) -> Result<Vec<ChatMessage>, StoreError> {
        self.check_reachable()?;
        let mut rows = self.lock().rows.clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        decode_rows(rows, policy, decode)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        self.check_reachable()?;
        Ok(self.lock().rows.len() as i64)
    }

    async fn close(&self) {}
}
