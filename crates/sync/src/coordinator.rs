// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync coordinator: owns the queue and drains it against the remote store.
//!
//! Per-item state machine:
//!
//! ```text
//! PENDING ──► IN_FLIGHT ──► SUCCEEDED          (removed)
//!                      ├──► FAILED_RETRYABLE   (back to PENDING, retry+1)
//!                      └──► FAILED_TERMINAL    (removed, logged)
//! ```
//!
//! A drain snapshots the pending list, attempts each item in FIFO order,
//! and removes successes and terminal failures in one batch. Drains are
//! serialized: a request arriving while one is in progress coalesces into
//! a no-op, so the same item is never delivered concurrently. If retryable
//! items remain after a pass, one re-drain is scheduled after a fixed
//! delay rather than immediately.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use gn_core::{Collection, PendingSyncItem, SyncOperation};

use crate::connectivity::{ConnectivityMonitor, Subscription};
use crate::error::Result;
use crate::queue::{FailureLog, SyncQueue};
use crate::remote::{RemoteSyncClient, Transport, WebSocketTransport};

/// Maximum delivery attempts per item before it becomes a terminal failure.
pub const MAX_ATTEMPTS: u32 = 3;

/// Default delay before re-draining when retryable items remain.
pub const REDRAIN_DELAY: Duration = Duration::from_secs(30);

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Items delivered and removed.
    pub delivered: usize,
    /// Items that exhausted their retry budget and moved to the failure log.
    pub failed_terminal: usize,
    /// Retryable items still pending after the pass.
    pub still_pending: usize,
    /// True if the request coalesced into an already-running drain.
    pub coalesced: bool,
}

/// Read-only sync status for the UI to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStatus {
    pub pending: usize,
    pub terminal_failures: usize,
    pub last_success: Option<DateTime<Utc>>,
}

/// Owns the durable queue and the remote client; drives delivery.
pub struct SyncCoordinator<T: Transport = WebSocketTransport> {
    queue: Mutex<SyncQueue>,
    client: Mutex<RemoteSyncClient<T>>,
    failures: FailureLog,
    draining: AtomicBool,
    last_success: StdMutex<Option<DateTime<Utc>>>,
    max_attempts: u32,
    redrain_delay: Option<Duration>,
    weak_self: Weak<Self>,
}

impl<T: Transport + 'static> SyncCoordinator<T> {
    /// Creates a coordinator with the default retry ceiling and re-drain
    /// delay.
    pub fn new(
        queue: SyncQueue,
        client: RemoteSyncClient<T>,
        failures: FailureLog,
    ) -> Arc<Self> {
        Self::with_policy(queue, client, failures, MAX_ATTEMPTS, Some(REDRAIN_DELAY))
    }

    /// Creates a coordinator with explicit retry/re-drain policy.
    ///
    /// `redrain_delay: None` disables automatic re-draining; callers must
    /// invoke [`SyncCoordinator::drain`] themselves.
    pub fn with_policy(
        queue: SyncQueue,
        client: RemoteSyncClient<T>,
        failures: FailureLog,
        max_attempts: u32,
        redrain_delay: Option<Duration>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| SyncCoordinator {
            queue: Mutex::new(queue),
            client: Mutex::new(client),
            failures,
            draining: AtomicBool::new(false),
            last_success: StdMutex::new(None),
            max_attempts,
            redrain_delay,
            weak_self: weak_self.clone(),
        })
    }

    /// The remote client, for read paths that bypass the queue.
    pub fn client(&self) -> &Mutex<RemoteSyncClient<T>> {
        &self.client
    }

    /// The terminal-failure log.
    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    /// Enqueues a mutation for later delivery. Returns the item id.
    pub async fn enqueue(
        &self,
        operation: SyncOperation,
        collection: Collection,
        payload: serde_json::Value,
    ) -> Result<String> {
        Ok(self
            .queue
            .lock()
            .await
            .enqueue(operation, collection, payload)?)
    }

    /// Delivers a mutation directly when online, falling back to the queue.
    ///
    /// A failed direct delivery is not an error for the caller: the local
    /// write already succeeded and eventual delivery is the contract.
    pub async fn deliver_or_enqueue(&self, item: PendingSyncItem, online: bool) -> Result<()> {
        if online {
            let mut client = self.client.lock().await;
            match client.apply(&item).await {
                Ok(()) => {
                    self.mark_success();
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("direct delivery of {} failed, queueing: {}", item.id, e);
                }
            }
        }
        self.queue.lock().await.enqueue_item(item)?;
        Ok(())
    }

    /// Runs one drain pass over the pending queue.
    ///
    /// Serialized: if a drain is already in progress this returns
    /// immediately with `coalesced` set.
    pub async fn drain(&self) -> Result<DrainReport> {
        if self.draining.swap(true, Ordering::AcqRel) {
            return Ok(DrainReport {
                coalesced: true,
                ..DrainReport::default()
            });
        }

        let result = self.drain_pass().await;
        self.draining.store(false, Ordering::Release);

        if let Ok(report) = &result {
            if report.still_pending > 0 {
                self.schedule_redrain();
            }
        }
        result
    }

    async fn drain_pass(&self) -> Result<DrainReport> {
        let snapshot: Vec<PendingSyncItem> = self.queue.lock().await.pending().to_vec();
        if snapshot.is_empty() {
            return Ok(DrainReport::default());
        }

        tracing::debug!("draining {} pending items", snapshot.len());

        let mut delivered: HashSet<String> = HashSet::new();
        let mut terminal: Vec<(PendingSyncItem, String)> = Vec::new();
        let mut retryable: Vec<String> = Vec::new();

        {
            let mut client = self.client.lock().await;
            for item in &snapshot {
                match client.apply(item).await {
                    Ok(()) => {
                        delivered.insert(item.id.clone());
                    }
                    Err(e) => {
                        let attempts = item.retry_count + 1;
                        if attempts >= self.max_attempts {
                            tracing::warn!(
                                "giving up on {} after {} attempts: {}",
                                item.id,
                                attempts,
                                e
                            );
                            terminal.push((item.clone(), e.to_string()));
                        } else {
                            tracing::debug!("delivery of {} failed (attempt {}): {}", item.id, attempts, e);
                            retryable.push(item.id.clone());
                        }
                    }
                }
            }
        }

        if !delivered.is_empty() {
            self.mark_success();
        }

        for (item, error) in &terminal {
            self.failures.append(item.clone(), error.clone())?;
        }

        let mut queue = self.queue.lock().await;
        let mut remove = delivered.clone();
        remove.extend(terminal.iter().map(|(item, _)| item.id.clone()));
        queue.remove(&remove)?;
        for id in &retryable {
            queue.record_failure(id)?;
        }

        Ok(DrainReport {
            delivered: delivered.len(),
            failed_terminal: terminal.len(),
            still_pending: retryable.len(),
            coalesced: false,
        })
    }

    /// Schedules one delayed drain. No-op when auto re-drain is disabled.
    fn schedule_redrain(&self) {
        let Some(delay) = self.redrain_delay else {
            return;
        };
        let Some(coordinator) = self.weak_self.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = coordinator.drain().await {
                tracing::warn!("scheduled drain failed: {}", e);
            }
        });
    }

    /// Subscribes the coordinator to connectivity transitions.
    ///
    /// Exactly one drain is triggered per offline→online edge; repeated
    /// online signals without an intervening offline do not re-trigger.
    pub fn watch_connectivity(&self, monitor: &ConnectivityMonitor) -> Subscription {
        let weak = self.weak_self.clone();
        let was_connected = AtomicBool::new(monitor.status().connected);
        monitor.subscribe(Arc::new(move |status| {
            let was = was_connected.swap(status.connected, Ordering::AcqRel);
            if !was && status.connected {
                if let Some(coordinator) = weak.upgrade() {
                    tokio::spawn(async move {
                        if let Err(e) = coordinator.drain().await {
                            tracing::warn!("reconnect drain failed: {}", e);
                        }
                    });
                }
            }
        }))
    }

    /// Read-only sync status.
    pub async fn status(&self) -> Result<QueueStatus> {
        let pending = self.queue.lock().await.len();
        let terminal_failures = self.failures.len()?;
        let last_success = *self.last_success.lock().unwrap_or_else(|e| e.into_inner());
        Ok(QueueStatus {
            pending,
            terminal_failures,
            last_success,
        })
    }

    fn mark_success(&self) {
        let mut last = self.last_success.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(Utc::now());
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
