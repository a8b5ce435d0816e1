// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync client for the remote document store.
//!
//! Provides a high-level interface for:
//! - Delivering queued mutations as idempotent upserts keyed by
//!   `(owner, local id)`
//! - Fetching remote-authoritative data per collection
//! - Anonymous sign-in with a pre-shared fallback identity
//! - Duplicate reconciliation over order records
//!
//! Every request is bounded by a timeout; a timeout is treated like any
//! other network failure and leaves retry decisions to the coordinator.

use std::time::Duration;

use serde_json::Value;

use gn_core::model::{doc_key, from_document, local_id_of, to_document, updated_at_of};
use gn_core::protocol::{ClientMessage, RemoteDoc, ServerMessage};
use gn_core::{
    Collection, Filling, Flavor, Order, OwnerId, PendingSyncItem, ShopSettings, SyncOperation,
};

use super::transport::{Transport, TransportError, WebSocketTransport};
use crate::config::RemoteConfig;

/// Error type for remote sync operations.
///
/// The coordinator does not distinguish variants for retry purposes; the
/// taxonomy exists for logging and for the failure log.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The request did not complete within the configured bound.
    #[error("request timed out")]
    Timeout,

    /// The remote store rejected the request (e.g. malformed payload).
    #[error("rejected by remote: {0}")]
    Rejected(String),

    /// Identity resolution failed.
    #[error("auth failed: {0}")]
    Auth(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for remote sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Client for the remote document store.
pub struct RemoteSyncClient<T: Transport = WebSocketTransport> {
    transport: T,
    url: String,
    /// Identity all documents are scoped to. Starts as the shared
    /// fallback; upgraded by [`RemoteSyncClient::sign_in`].
    owner: OwnerId,
    request_timeout: Duration,
}

impl RemoteSyncClient<WebSocketTransport> {
    /// Create a new client with the default WebSocket transport.
    pub fn new(config: &RemoteConfig) -> Self {
        Self::with_transport(config, WebSocketTransport::new())
    }
}

impl<T: Transport> RemoteSyncClient<T> {
    /// Create a new client with a custom transport (for testing).
    pub fn with_transport(config: &RemoteConfig, transport: T) -> Self {
        RemoteSyncClient {
            transport,
            url: config.url.clone(),
            owner: OwnerId::shared(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    /// The identity documents are currently scoped to.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Overrides the identity. Useful for tests and for restoring a
    /// previously persisted identity at startup.
    pub fn set_owner(&mut self, owner: OwnerId) {
        self.owner = owner;
    }

    /// Check if the transport is connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Disconnect from the remote store.
    pub async fn disconnect(&mut self) -> SyncResult<()> {
        self.transport.disconnect().await?;
        Ok(())
    }

    /// Send a request, connecting lazily, bounded by the request timeout.
    async fn request(&mut self, msg: ClientMessage) -> SyncResult<ServerMessage> {
        if !self.transport.is_connected() {
            match tokio::time::timeout(self.request_timeout, self.transport.connect(&self.url))
                .await
            {
                Ok(result) => result?,
                Err(_) => return Err(SyncError::Timeout),
            }
        }

        match tokio::time::timeout(self.request_timeout, self.transport.request(msg)).await {
            Ok(Ok(ServerMessage::Error { message })) => Err(SyncError::Rejected(message)),
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                // The request/response pairing is now ambiguous; drop the
                // connection so the next request starts clean.
                let _ = self.transport.disconnect().await;
                Err(SyncError::Timeout)
            }
        }
    }

    /// Resolves the anonymous identity.
    ///
    /// Sync never blocks on identity resolution: if sign-in fails for any
    /// reason the pre-shared fallback identity is used.
    pub async fn sign_in(&mut self) -> OwnerId {
        match self.request(ClientMessage::sign_in()).await {
            Ok(ServerMessage::Identity { owner_id }) => {
                self.owner = OwnerId::new(owner_id);
            }
            Ok(other) => {
                tracing::warn!("unexpected sign-in response {:?}, using shared identity", other);
                self.owner = OwnerId::shared();
            }
            Err(e) => {
                tracing::warn!("anonymous sign-in failed ({}), using shared identity", e);
                self.owner = OwnerId::shared();
            }
        }
        self.owner.clone()
    }

    /// Delivers a queued mutation to the remote store.
    pub async fn apply(&mut self, item: &PendingSyncItem) -> SyncResult<()> {
        match item.operation {
            SyncOperation::Create | SyncOperation::Update => {
                self.upsert(item.collection, &item.payload).await
            }
            SyncOperation::Delete => {
                let key = self.item_key(item.collection, &item.payload)?;
                self.delete_doc(item.collection, key).await
            }
        }
    }

    /// Upserts a record document. Both creates and updates map to a full
    /// replace under a deterministic key, so repeated delivery after a
    /// retry cannot create duplicates.
    async fn upsert(&mut self, collection: Collection, payload: &Value) -> SyncResult<()> {
        let key = self.item_key(collection, payload)?;
        let mut doc = payload.clone();
        if let Some(map) = doc.as_object_mut() {
            map.insert("owner_id".to_string(), Value::String(self.owner.to_string()));
        }
        match self.request(ClientMessage::set(collection, key, doc)).await? {
            ServerMessage::Ack => Ok(()),
            other => Err(unexpected("ack", &other)),
        }
    }

    async fn delete_doc(&mut self, collection: Collection, key: String) -> SyncResult<()> {
        match self.request(ClientMessage::delete(collection, key)).await? {
            ServerMessage::Ack => Ok(()),
            other => Err(unexpected("ack", &other)),
        }
    }

    /// The document key for a payload: settings use the owner itself,
    /// everything else combines owner and local id.
    fn item_key(&self, collection: Collection, payload: &Value) -> SyncResult<String> {
        if collection == Collection::Settings {
            return Ok(self.owner.to_string());
        }
        let id = local_id_of(payload)
            .map_err(|_| SyncError::Rejected("payload is missing a local id".to_string()))?;
        Ok(doc_key(&self.owner, id))
    }

    /// Fetches this owner's orders, ordered by delivery date ascending.
    pub async fn fetch_orders(&mut self) -> SyncResult<Vec<Order>> {
        let docs = self
            .query(Collection::Orders, Some("delivery_date".to_string()))
            .await?;
        Ok(parse_docs(docs))
    }

    /// Fetches a single order by local id.
    pub async fn fetch_order(&mut self, id: i64) -> SyncResult<Option<Order>> {
        let key = doc_key(&self.owner, id);
        match self.request(ClientMessage::get(Collection::Orders, key)).await? {
            ServerMessage::Doc { doc: None } => Ok(None),
            ServerMessage::Doc { doc: Some(doc) } => Ok(from_document(doc)
                .map_err(|e| SyncError::Rejected(e.to_string()))
                .map(Some)?),
            other => Err(unexpected("doc", &other)),
        }
    }

    /// Fetches the flavor catalog. Remote-authoritative.
    pub async fn fetch_flavors(&mut self) -> SyncResult<Vec<Flavor>> {
        let docs = self
            .query(Collection::Flavors, Some("name".to_string()))
            .await?;
        Ok(parse_docs(docs))
    }

    /// Fetches the filling catalog. Remote-authoritative.
    pub async fn fetch_fillings(&mut self) -> SyncResult<Vec<Filling>> {
        let docs = self
            .query(Collection::Fillings, Some("name".to_string()))
            .await?;
        Ok(parse_docs(docs))
    }

    /// Fetches this owner's settings document.
    pub async fn fetch_settings(&mut self) -> SyncResult<Option<ShopSettings>> {
        let key = self.owner.to_string();
        match self
            .request(ClientMessage::get(Collection::Settings, key))
            .await?
        {
            ServerMessage::Doc { doc: None } => Ok(None),
            ServerMessage::Doc { doc: Some(doc) } => Ok(from_document(doc)
                .map_err(|e| SyncError::Rejected(e.to_string()))
                .map(Some)?),
            other => Err(unexpected("doc", &other)),
        }
    }

    /// Uploads all given orders as upserts. Returns the number pushed.
    pub async fn push_orders(&mut self, orders: &[Order]) -> SyncResult<usize> {
        for order in orders {
            let doc = to_document(order, &self.owner)
                .map_err(|e| SyncError::Rejected(e.to_string()))?;
            let key = doc_key(&self.owner, order.id);
            match self
                .request(ClientMessage::set(Collection::Orders, key, doc))
                .await?
            {
                ServerMessage::Ack => {}
                other => return Err(unexpected("ack", &other)),
            }
        }
        Ok(orders.len())
    }

    /// Uploads the flavor catalog as upserts.
    pub async fn push_flavors(&mut self, flavors: &[Flavor]) -> SyncResult<usize> {
        for flavor in flavors {
            let doc = to_document(flavor, &self.owner)
                .map_err(|e| SyncError::Rejected(e.to_string()))?;
            let key = doc_key(&self.owner, flavor.id);
            match self
                .request(ClientMessage::set(Collection::Flavors, key, doc))
                .await?
            {
                ServerMessage::Ack => {}
                other => return Err(unexpected("ack", &other)),
            }
        }
        Ok(flavors.len())
    }

    /// Uploads the filling catalog as upserts.
    pub async fn push_fillings(&mut self, fillings: &[Filling]) -> SyncResult<usize> {
        for filling in fillings {
            let doc = to_document(filling, &self.owner)
                .map_err(|e| SyncError::Rejected(e.to_string()))?;
            let key = doc_key(&self.owner, filling.id);
            match self
                .request(ClientMessage::set(Collection::Fillings, key, doc))
                .await?
            {
                ServerMessage::Ack => {}
                other => return Err(unexpected("ack", &other)),
            }
        }
        Ok(fillings.len())
    }

    /// Uploads the settings document.
    pub async fn push_settings(&mut self, settings: &ShopSettings) -> SyncResult<()> {
        let doc = to_document(settings, &self.owner)
            .map_err(|e| SyncError::Rejected(e.to_string()))?;
        let key = self.owner.to_string();
        match self
            .request(ClientMessage::set(Collection::Settings, key, doc))
            .await?
        {
            ServerMessage::Ack => Ok(()),
            other => Err(unexpected("ack", &other)),
        }
    }

    /// Removes duplicate order documents for this owner.
    ///
    /// Bulk uploads with non-deterministic keys can leave several documents
    /// describing the same order. Two passes, each keeping the document
    /// with the latest `updated_at`:
    ///
    /// 1. documents sharing the same embedded local id
    /// 2. among the survivors, documents sharing the same content key
    ///    (`name|deliveryDate|price`)
    ///
    /// Corrective, not correctness-critical; running it twice deletes
    /// nothing on the second run. Returns the number of deleted documents.
    pub async fn dedupe_orders(&mut self) -> SyncResult<usize> {
        let docs = self.query(Collection::Orders, None).await?;

        let mut deleted = 0;

        // Pass 1: exact-id duplicates.
        let survivors = {
            let mut groups: Vec<(i64, Vec<&RemoteDoc>)> = Vec::new();
            let mut keyless: Vec<&RemoteDoc> = Vec::new();
            for doc in &docs {
                match local_id_of(&doc.data) {
                    Ok(id) => match groups.iter_mut().find(|(gid, _)| *gid == id) {
                        Some((_, group)) => group.push(doc),
                        None => groups.push((id, vec![doc])),
                    },
                    // Documents without an id are left untouched.
                    Err(_) => keyless.push(doc),
                }
            }

            let mut survivors: Vec<&RemoteDoc> = keyless;
            for (_, group) in groups {
                let (keep, losers) = split_latest(group);
                survivors.push(keep);
                for loser in losers {
                    self.delete_doc(Collection::Orders, loser.key.clone()).await?;
                    deleted += 1;
                }
            }
            survivors
        };

        // Pass 2: content-key duplicates among the survivors.
        let mut groups: Vec<(String, Vec<&RemoteDoc>)> = Vec::new();
        for doc in survivors {
            let Ok(order) = from_document::<Order>(doc.data.clone()) else {
                continue;
            };
            let key = order.content_key();
            match groups.iter_mut().find(|(gkey, _)| *gkey == key) {
                Some((_, group)) => group.push(doc),
                None => groups.push((key, vec![doc])),
            }
        }
        for (_, group) in groups {
            let (_, losers) = split_latest(group);
            for loser in losers {
                self.delete_doc(Collection::Orders, loser.key.clone()).await?;
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn query(
        &mut self,
        collection: Collection,
        order_by: Option<String>,
    ) -> SyncResult<Vec<RemoteDoc>> {
        let owner = self.owner.to_string();
        match self
            .request(ClientMessage::query(collection, owner, order_by))
            .await?
        {
            ServerMessage::Docs { docs } => Ok(docs),
            other => Err(unexpected("docs", &other)),
        }
    }
}

fn unexpected(wanted: &str, got: &ServerMessage) -> SyncError {
    SyncError::Rejected(format!("expected {wanted} response, got {got:?}"))
}

/// Parses query results, skipping documents that no longer match the
/// record shape rather than failing the whole fetch.
fn parse_docs<R: for<'de> serde::Deserialize<'de>>(docs: Vec<RemoteDoc>) -> Vec<R> {
    let mut records = Vec::new();
    for doc in docs {
        match from_document(doc.data) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("skipping malformed document {}: {}", doc.key, e),
        }
    }
    records
}

/// Splits a non-empty group into the document with the latest `updated_at`
/// and the rest. Missing timestamps sort earliest; ties keep the first.
fn split_latest(group: Vec<&RemoteDoc>) -> (&RemoteDoc, Vec<&RemoteDoc>) {
    let mut iter = group.into_iter();
    // Groups are built by pushing at least one element.
    #[allow(clippy::expect_used)]
    let mut keep = iter.next().expect("group is never empty");
    let mut losers = Vec::new();
    for doc in iter {
        if updated_at_of(&doc.data) > updated_at_of(&keep.data) {
            losers.push(keep);
            keep = doc;
        } else {
            losers.push(doc);
        }
    }
    (keep, losers)
}
