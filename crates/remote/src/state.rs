// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! An in-memory document map keyed by (collection, key), scoped per owner
//! through the `owner_id` field each document carries. Good enough for
//! development and protocol testing; nothing is persisted across restarts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use gn_core::protocol::RemoteDoc;
use gn_core::Collection;

/// Shared server state containing the document map.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

struct ServerStateInner {
    /// Documents keyed by (collection, key).
    docs: Mutex<HashMap<(Collection, String), Value>>,
    /// Counter for issued anonymous identities.
    next_owner: AtomicU64,
}

impl ServerState {
    /// Creates empty server state.
    pub fn new() -> Self {
        ServerState {
            inner: Arc::new(ServerStateInner {
                docs: Mutex::new(HashMap::new()),
                next_owner: AtomicU64::new(1),
            }),
        }
    }

    /// Issues a fresh anonymous owner identity.
    pub fn sign_in(&self) -> String {
        let n = self.inner.next_owner.fetch_add(1, Ordering::SeqCst);
        format!("anon-{:06}", n)
    }

    /// Writes a document, replacing any existing one under the key.
    pub async fn set(&self, collection: Collection, key: String, doc: Value) {
        self.inner.docs.lock().await.insert((collection, key), doc);
    }

    /// Shallow-merges fields into a document, creating it if missing.
    pub async fn update(&self, collection: Collection, key: String, doc: Value) {
        let mut docs = self.inner.docs.lock().await;
        let entry = docs
            .entry((collection, key))
            .or_insert_with(|| Value::Object(Default::default()));
        if let (Some(base), Some(patch)) = (entry.as_object_mut(), doc.as_object()) {
            for (k, v) in patch {
                base.insert(k.clone(), v.clone());
            }
        }
    }

    /// Deletes a document. Deleting a missing document is a no-op.
    pub async fn delete(&self, collection: Collection, key: &str) {
        self.inner
            .docs
            .lock()
            .await
            .remove(&(collection, key.to_string()));
    }

    /// Fetches a single document.
    pub async fn get(&self, collection: Collection, key: &str) -> Option<Value> {
        self.inner
            .docs
            .lock()
            .await
            .get(&(collection, key.to_string()))
            .cloned()
    }

    /// All documents in a collection belonging to one owner, optionally
    /// ordered by a field (ascending). Documents without the field sort
    /// first; ties fall back to key order for determinism.
    pub async fn query(
        &self,
        collection: Collection,
        owner_id: &str,
        order_by: Option<&str>,
    ) -> Vec<RemoteDoc> {
        let docs = self.inner.docs.lock().await;
        let mut matching: Vec<RemoteDoc> = docs
            .iter()
            .filter(|((c, _), data)| {
                *c == collection
                    && data.get("owner_id").and_then(Value::as_str) == Some(owner_id)
            })
            .map(|((_, key), data)| RemoteDoc {
                key: key.clone(),
                data: data.clone(),
            })
            .collect();
        matching.sort_by(|a, b| match order_by {
            Some(field) => {
                compare_field(&a.data, &b.data, field).then_with(|| a.key.cmp(&b.key))
            }
            None => a.key.cmp(&b.key),
        });
        matching
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Orders two documents by a field: strings lexicographically, numbers
/// numerically, missing values first.
fn compare_field(a: &Value, b: &Value, field: &str) -> std::cmp::Ordering {
    let av = a.get(field);
    let bv = b.get(field);
    match (av.and_then(Value::as_str), bv.and_then(Value::as_str)) {
        (Some(x), Some(y)) => x.cmp(y),
        _ => {
            let x = av.and_then(Value::as_f64).unwrap_or(f64::MIN);
            let y = bv.and_then(Value::as_f64).unwrap_or(f64::MIN);
            x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
        }
    }
}
