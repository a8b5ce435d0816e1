// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of pending mutations and the terminal-failure log.
//!
//! The queue is an ordered list of [`PendingSyncItem`]s persisted to the
//! local store's blob table. Every mutation (enqueue, remove, clear, retry
//! bump) rewrites the blob synchronously, so a crash can never lose queue
//! state older than the last successful persist. Order is FIFO by enqueue
//! time.
//!
//! Items leave the queue only on a confirmed remote apply or after
//! exceeding the retry ceiling — in the latter case they move to the
//! [`FailureLog`], never silently dropped.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gn_core::{Collection, PendingSyncItem, SyncOperation};

use crate::store::{LocalStore, StoreError};

/// Blob key the queue is persisted under.
pub const QUEUE_BLOB_KEY: &str = "sync_queue";

/// Blob key the terminal-failure log is persisted under.
pub const FAILURES_BLOB_KEY: &str = "sync_failures";

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Local store failure while persisting or loading.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Ordered, persisted list of pending mutations.
pub struct SyncQueue {
    store: Arc<dyn LocalStore>,
    items: Vec<PendingSyncItem>,
}

impl SyncQueue {
    /// Loads the queue from the local store.
    ///
    /// Unparseable persisted state is treated as an empty queue: losing
    /// queued mutations is preferred over failing startup.
    pub fn open(store: Arc<dyn LocalStore>) -> QueueResult<Self> {
        let items = match store.get_blob(QUEUE_BLOB_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("discarding unparseable sync queue: {}", e);
                    Vec::new()
                }
            },
        };
        Ok(SyncQueue { store, items })
    }

    /// Builds and enqueues a new item, returning its id.
    pub fn enqueue(
        &mut self,
        operation: SyncOperation,
        collection: Collection,
        payload: Value,
    ) -> QueueResult<String> {
        let item = PendingSyncItem::new(operation, collection, payload);
        let id = item.id.clone();
        self.enqueue_item(item)?;
        Ok(id)
    }

    /// Enqueues an already-built item (e.g. one whose direct delivery failed).
    pub fn enqueue_item(&mut self, item: PendingSyncItem) -> QueueResult<()> {
        self.items.push(item);
        self.persist()
    }

    /// All pending items, insertion order preserved.
    pub fn pending(&self) -> &[PendingSyncItem] {
        &self.items
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes the given items in one batch.
    pub fn remove(&mut self, ids: &HashSet<String>) -> QueueResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.items.retain(|item| !ids.contains(&item.id));
        self.persist()
    }

    /// Clears all pending items.
    pub fn clear(&mut self) -> QueueResult<()> {
        self.items.clear();
        self.persist()
    }

    /// Records a failed delivery attempt for the given item.
    ///
    /// Returns the new retry count, or `None` if the item is no longer
    /// queued.
    pub fn record_failure(&mut self, id: &str) -> QueueResult<Option<u32>> {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        item.retry_count += 1;
        let count = item.retry_count;
        self.persist()?;
        Ok(Some(count))
    }

    fn persist(&self) -> QueueResult<()> {
        let raw = serde_json::to_string(&self.items)?;
        self.store.put_blob(QUEUE_BLOB_KEY, &raw)?;
        Ok(())
    }
}

/// A queue item that exhausted its retry budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalFailure {
    pub item: PendingSyncItem,
    /// Description of the last delivery error.
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Persisted log of terminal failures, available for the UI on demand.
pub struct FailureLog {
    store: Arc<dyn LocalStore>,
}

impl FailureLog {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        FailureLog { store }
    }

    /// Appends a failed item to the log.
    pub fn append(&self, item: PendingSyncItem, error: String) -> QueueResult<()> {
        let mut failures = self.list()?;
        failures.push(TerminalFailure {
            item,
            error,
            failed_at: Utc::now(),
        });
        let raw = serde_json::to_string(&failures)?;
        self.store.put_blob(FAILURES_BLOB_KEY, &raw)?;
        Ok(())
    }

    /// All logged failures, oldest first.
    ///
    /// Like the queue, an unparseable log loads as empty.
    pub fn list(&self) -> QueueResult<Vec<TerminalFailure>> {
        match self.store.get_blob(FAILURES_BLOB_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(failures) => Ok(failures),
                Err(e) => {
                    tracing::warn!("discarding unparseable failure log: {}", e);
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Number of logged failures.
    pub fn len(&self) -> QueueResult<usize> {
        Ok(self.list()?.len())
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Clears the log (e.g. after the user has acknowledged the failures).
    pub fn clear(&self) -> QueueResult<()> {
        self.store.delete_blob(FAILURES_BLOB_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
