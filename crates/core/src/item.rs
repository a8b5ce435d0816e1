// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending sync items: durable records of mutations awaiting delivery.
//!
//! Every write performed while offline (or whose direct remote delivery
//! failed) becomes a [`PendingSyncItem`]. Items live in the durable sync
//! queue until a confirmed remote apply or until they exhaust their retry
//! budget, at which point they move to the failure log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::collection::{Collection, SyncOperation};

/// A queued mutation awaiting delivery to the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSyncItem {
    /// Unique id within the queue, derived from collection, operation,
    /// enqueue time, and a random component.
    pub id: String,
    pub operation: SyncOperation,
    pub collection: Collection,
    /// The record payload as it should reach the remote store. Opaque to
    /// the queue; interpreted by the remote sync client.
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
    /// Number of failed delivery attempts so far. Only ever increases.
    pub retry_count: u32,
}

impl PendingSyncItem {
    /// Creates a new pending item with a fresh unique id and zero retries.
    pub fn new(operation: SyncOperation, collection: Collection, payload: Value) -> Self {
        let enqueued_at = Utc::now();
        let id = generate_item_id(collection, operation, &enqueued_at, rand::random::<u64>());
        PendingSyncItem {
            id,
            operation,
            collection,
            payload,
            enqueued_at,
            retry_count: 0,
        }
    }

    /// Reads the local record id out of the payload, if present.
    ///
    /// Delete payloads carry only `{ "id": ... }`; create and update
    /// payloads carry the full record.
    pub fn local_id(&self) -> Option<i64> {
        self.payload.get("id").and_then(Value::as_i64)
    }
}

/// Generate a queue-item id.
/// Format: {collection}-{operation}-{hash} where hash is the first 12 hex
/// chars of SHA256(collection + operation + timestamp + random).
fn generate_item_id(
    collection: Collection,
    operation: SyncOperation,
    enqueued_at: &DateTime<Utc>,
    random: u64,
) -> String {
    let input = format!(
        "{}{}{}{}",
        collection.as_str(),
        operation.as_str(),
        enqueued_at.timestamp_nanos_opt().unwrap_or_default(),
        random
    );
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..6]); // First 12 hex chars (6 bytes)
    format!("{}-{}-{}", collection.as_str(), operation.as_str(), short_hash)
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
