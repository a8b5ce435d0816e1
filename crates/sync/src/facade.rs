// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hybrid data facade: the single entry point for the rest of the app.
//!
//! Every write goes to the local store first — that write must succeed or
//! the whole operation fails, since local storage is the durability
//! baseline. The remote mirror is then either a direct call (when online)
//! or a queued item (when offline, or when the direct call fails); remote
//! problems are never surfaced to the caller of a write.
//!
//! Reads follow the per-collection reconciliation policy: orders merge
//! remote records into the local store by id, reference data (flavors,
//! fillings) and settings are remote-authoritative.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use gn_core::{
    Collection, Filling, Flavor, ImageReference, Order, PendingSyncItem, ShopSettings,
    SyncOperation,
};

use crate::connectivity::ConnectivityMonitor;
use crate::coordinator::{DrainReport, QueueStatus, SyncCoordinator};
use crate::error::{Error, Result};
use crate::images::PendingUploads;
use crate::remote::{Transport, WebSocketTransport};
use crate::store::LocalStore;

/// Fields the UI provides when creating an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer: String,
    pub flavor: String,
    pub filling: String,
    pub price: f64,
    pub delivery_date: NaiveDate,
    pub notes: Option<String>,
}

/// Counts of records reconciled by [`HybridStore::pull_remote`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullReport {
    pub orders: usize,
    pub flavors: usize,
    pub fillings: usize,
    pub settings_updated: bool,
}

/// The application-facing data store.
pub struct HybridStore<T: Transport = WebSocketTransport> {
    local: Arc<dyn LocalStore>,
    coordinator: Arc<SyncCoordinator<T>>,
    monitor: ConnectivityMonitor,
    uploads: PendingUploads,
    remote_enabled: bool,
}

impl<T: Transport + 'static> HybridStore<T> {
    /// Wires the facade to its collaborators.
    ///
    /// With `remote_enabled` false the facade is purely local: nothing is
    /// mirrored or queued and reads never touch the network.
    pub fn new(
        local: Arc<dyn LocalStore>,
        coordinator: Arc<SyncCoordinator<T>>,
        monitor: ConnectivityMonitor,
        remote_enabled: bool,
    ) -> Self {
        let uploads = PendingUploads::new(Arc::clone(&local));
        HybridStore {
            local,
            coordinator,
            monitor,
            uploads,
            remote_enabled,
        }
    }

    fn online(&self) -> bool {
        self.monitor.status().connected
    }

    /// Mirrors a local write to the remote store: directly when online,
    /// queued otherwise. Never fails the caller for remote reasons.
    async fn mirror(
        &self,
        operation: SyncOperation,
        collection: Collection,
        payload: serde_json::Value,
    ) -> Result<()> {
        if !self.remote_enabled {
            return Ok(());
        }
        let item = PendingSyncItem::new(operation, collection, payload);
        self.coordinator.deliver_or_enqueue(item, self.online()).await
    }

    // ----- orders -----

    /// Creates an order: local insert, then remote mirror.
    pub async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        let now = Utc::now();
        let mut order = Order {
            id: 0,
            customer: draft.customer,
            flavor: draft.flavor,
            filling: draft.filling,
            price: draft.price,
            delivery_date: draft.delivery_date,
            notes: draft.notes,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        order.id = self.local.insert_order(&order)?;
        self.mirror(
            SyncOperation::Create,
            Collection::Orders,
            serde_json::to_value(&order)?,
        )
        .await?;
        Ok(order)
    }

    /// Updates an order: local update, then remote mirror.
    pub async fn update_order(&self, mut order: Order) -> Result<Order> {
        order.updated_at = Utc::now();
        self.local.update_order(&order)?;
        self.mirror(
            SyncOperation::Update,
            Collection::Orders,
            serde_json::to_value(&order)?,
        )
        .await?;
        Ok(order)
    }

    /// Deletes an order locally and mirrors the deletion.
    pub async fn delete_order(&self, id: i64) -> Result<()> {
        self.local.delete_order(id)?;
        self.mirror(
            SyncOperation::Delete,
            Collection::Orders,
            serde_json::json!({ "id": id }),
        )
        .await
    }

    /// Lists orders. When online, remote records are merged into the local
    /// store by id first; local-only orders survive the merge.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        if self.remote_enabled && self.online() {
            let fetched = self.coordinator.client().lock().await.fetch_orders().await;
            match fetched {
                Ok(remote) => {
                    for order in &remote {
                        self.local.upsert_order(order)?;
                    }
                }
                Err(e) => {
                    tracing::debug!("remote order fetch failed, serving local: {}", e);
                }
            }
        }
        Ok(self.local.list_orders()?)
    }

    /// Fetches one order, preferring the remote copy.
    pub async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        if self.remote_enabled && self.online() {
            let fetched = self.coordinator.client().lock().await.fetch_order(id).await;
            match fetched {
                Ok(Some(order)) => {
                    self.local.upsert_order(&order)?;
                    return Ok(Some(order));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!("remote order fetch failed, serving local: {}", e);
                }
            }
        }
        Ok(self.local.get_order(id)?)
    }

    // ----- reference data -----

    /// Creates a flavor: local insert, then remote mirror. The record is
    /// pushed once; from then on the remote copy is authoritative.
    pub async fn create_flavor(&self, name: String, price: f64) -> Result<Flavor> {
        let mut flavor = Flavor {
            id: 0,
            name,
            price,
            updated_at: Utc::now(),
        };
        flavor.id = self.local.insert_flavor(&flavor)?;
        self.mirror(
            SyncOperation::Create,
            Collection::Flavors,
            serde_json::to_value(&flavor)?,
        )
        .await?;
        Ok(flavor)
    }

    /// Updates a flavor locally and mirrors the change.
    pub async fn update_flavor(&self, mut flavor: Flavor) -> Result<Flavor> {
        flavor.updated_at = Utc::now();
        self.local.update_flavor(&flavor)?;
        self.mirror(
            SyncOperation::Update,
            Collection::Flavors,
            serde_json::to_value(&flavor)?,
        )
        .await?;
        Ok(flavor)
    }

    /// Deletes a flavor locally and mirrors the deletion.
    pub async fn delete_flavor(&self, id: i64) -> Result<()> {
        self.local.delete_flavor(id)?;
        self.mirror(
            SyncOperation::Delete,
            Collection::Flavors,
            serde_json::json!({ "id": id }),
        )
        .await
    }

    /// Lists flavors. Remote-authoritative: a successful fetch replaces the
    /// local copy even when empty — an empty result means "no reference
    /// data yet", not a reason to serve stale local state. Only a failed
    /// fetch falls back to the local copy.
    pub async fn list_flavors(&self) -> Result<Vec<Flavor>> {
        if self.remote_enabled && self.online() {
            let fetched = self.coordinator.client().lock().await.fetch_flavors().await;
            match fetched {
                Ok(remote) => {
                    self.local.replace_flavors(&remote)?;
                    return Ok(remote);
                }
                Err(e) => {
                    tracing::debug!("remote flavor fetch failed, serving local: {}", e);
                }
            }
        }
        Ok(self.local.list_flavors()?)
    }

    /// Creates a filling: local insert, then remote mirror.
    pub async fn create_filling(&self, name: String, price: f64) -> Result<Filling> {
        let mut filling = Filling {
            id: 0,
            name,
            price,
            updated_at: Utc::now(),
        };
        filling.id = self.local.insert_filling(&filling)?;
        self.mirror(
            SyncOperation::Create,
            Collection::Fillings,
            serde_json::to_value(&filling)?,
        )
        .await?;
        Ok(filling)
    }

    /// Updates a filling locally and mirrors the change.
    pub async fn update_filling(&self, mut filling: Filling) -> Result<Filling> {
        filling.updated_at = Utc::now();
        self.local.update_filling(&filling)?;
        self.mirror(
            SyncOperation::Update,
            Collection::Fillings,
            serde_json::to_value(&filling)?,
        )
        .await?;
        Ok(filling)
    }

    /// Deletes a filling locally and mirrors the deletion.
    pub async fn delete_filling(&self, id: i64) -> Result<()> {
        self.local.delete_filling(id)?;
        self.mirror(
            SyncOperation::Delete,
            Collection::Fillings,
            serde_json::json!({ "id": id }),
        )
        .await
    }

    /// Lists fillings. Remote-authoritative, same rules as flavors.
    pub async fn list_fillings(&self) -> Result<Vec<Filling>> {
        if self.remote_enabled && self.online() {
            let fetched = self.coordinator.client().lock().await.fetch_fillings().await;
            match fetched {
                Ok(remote) => {
                    self.local.replace_fillings(&remote)?;
                    return Ok(remote);
                }
                Err(e) => {
                    tracing::debug!("remote filling fetch failed, serving local: {}", e);
                }
            }
        }
        Ok(self.local.list_fillings()?)
    }

    // ----- settings -----

    /// Returns the shop settings, preferring the remote copy and falling
    /// back to the local one, then to the defaults.
    pub async fn settings(&self) -> Result<ShopSettings> {
        if self.remote_enabled && self.online() {
            let fetched = self.coordinator.client().lock().await.fetch_settings().await;
            match fetched {
                Ok(Some(settings)) => {
                    self.local.put_settings(&settings)?;
                    return Ok(settings);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!("remote settings fetch failed, serving local: {}", e);
                }
            }
        }
        Ok(self.local.get_settings()?.unwrap_or_default())
    }

    /// Saves the shop settings: local write, then remote mirror.
    pub async fn save_settings(&self, mut settings: ShopSettings) -> Result<ShopSettings> {
        settings.updated_at = Utc::now();
        self.local.put_settings(&settings)?;
        self.mirror(
            SyncOperation::Update,
            Collection::Settings,
            serde_json::to_value(&settings)?,
        )
        .await?;
        Ok(settings)
    }

    // ----- images -----

    /// Records a reference photo for an order.
    ///
    /// The photo joins the best-effort upload pipeline; it is never placed
    /// on the sync queue.
    pub fn attach_image(&self, order_id: i64, local_path: String) -> Result<ImageReference> {
        if self.local.get_order(order_id)?.is_none() {
            return Err(Error::OrderNotFound(order_id));
        }
        let reference = ImageReference {
            order_id,
            local_path,
            remote_url: None,
            uploaded: false,
            created_at: Utc::now(),
        };
        self.uploads.push(reference.clone())?;
        Ok(reference)
    }

    /// The pending image uploads, for the uploader and the UI.
    pub fn pending_uploads(&self) -> &PendingUploads {
        &self.uploads
    }

    // ----- manual sync primitives -----

    /// Drains the pending queue now. What to offer around this is the
    /// presentation layer's decision.
    pub async fn sync_now(&self) -> Result<DrainReport> {
        self.coordinator.drain().await
    }

    /// Downloads all collections and reconciles them into the local store
    /// per their policies.
    pub async fn pull_remote(&self) -> Result<PullReport> {
        let mut client = self.coordinator.client().lock().await;
        let orders = client.fetch_orders().await?;
        let flavors = client.fetch_flavors().await?;
        let fillings = client.fetch_fillings().await?;
        let settings = client.fetch_settings().await?;
        drop(client);

        for order in &orders {
            self.local.upsert_order(order)?;
        }
        self.local.replace_flavors(&flavors)?;
        self.local.replace_fillings(&fillings)?;
        let settings_updated = match settings {
            Some(settings) => {
                self.local.put_settings(&settings)?;
                true
            }
            None => false,
        };

        Ok(PullReport {
            orders: orders.len(),
            flavors: flavors.len(),
            fillings: fillings.len(),
            settings_updated,
        })
    }

    /// Uploads every local record as an upsert. Returns the number of
    /// documents pushed. Pair with [`HybridStore::dedupe_remote`] to clean
    /// up documents older uploads may have left behind.
    pub async fn push_local(&self) -> Result<usize> {
        let orders = self.local.list_orders()?;
        let flavors = self.local.list_flavors()?;
        let fillings = self.local.list_fillings()?;
        let settings = self.local.get_settings()?;

        let mut client = self.coordinator.client().lock().await;
        let mut pushed = client.push_orders(&orders).await?;
        pushed += client.push_flavors(&flavors).await?;
        pushed += client.push_fillings(&fillings).await?;
        if let Some(settings) = settings {
            client.push_settings(&settings).await?;
            pushed += 1;
        }
        Ok(pushed)
    }

    /// Removes duplicate remote order documents. Returns deletions made.
    pub async fn dedupe_remote(&self) -> Result<usize> {
        Ok(self.coordinator.client().lock().await.dedupe_orders().await?)
    }

    /// Read-only sync status for the UI.
    pub async fn queue_status(&self) -> Result<QueueStatus> {
        self.coordinator.status().await
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
