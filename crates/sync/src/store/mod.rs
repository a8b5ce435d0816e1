// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local persistent storage.
//!
//! [`LocalStore`] is the capability interface the rest of the engine is
//! written against: synchronous CRUD for the four synced collections plus a
//! string-keyed blob table backing the sync queue, failure log, and image
//! reference list. Two implementations exist — [`SqliteStore`] for devices
//! and [`MemoryStore`] for tests and ephemeral environments — selected once
//! at startup via [`crate::config::StorageConfig`].

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use gn_core::{Filling, Flavor, Order, ShopSettings};

use crate::config::{StorageConfig, StorageEngine};

/// Error type for local store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record required by the operation does not exist.
    #[error("record not found: {collection}/{id}")]
    NotFound {
        collection: &'static str,
        id: i64,
    },

    /// Persisted data that could not be interpreted.
    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// Result type for local store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Synchronous CRUD over the device-local store.
///
/// The local store is the durability baseline: it is assumed always
/// available, and its failures are the only fatal class on the write path.
/// Deletes are idempotent; updates of missing records fail with
/// [`StoreError::NotFound`].
pub trait LocalStore: Send + Sync {
    // Orders
    fn list_orders(&self) -> StoreResult<Vec<Order>>;
    fn get_order(&self, id: i64) -> StoreResult<Option<Order>>;
    /// Inserts an order. An id of 0 means "assign one"; a positive id is
    /// kept as-is (used when merging remote records in).
    fn insert_order(&self, order: &Order) -> StoreResult<i64>;
    fn update_order(&self, order: &Order) -> StoreResult<()>;
    fn delete_order(&self, id: i64) -> StoreResult<()>;
    /// Insert-or-replace keyed by id. Used by merge-by-id reconciliation.
    fn upsert_order(&self, order: &Order) -> StoreResult<()>;

    // Flavors
    fn list_flavors(&self) -> StoreResult<Vec<Flavor>>;
    fn insert_flavor(&self, flavor: &Flavor) -> StoreResult<i64>;
    fn update_flavor(&self, flavor: &Flavor) -> StoreResult<()>;
    fn delete_flavor(&self, id: i64) -> StoreResult<()>;
    /// Replaces the whole collection. Used by remote-wins reconciliation.
    fn replace_flavors(&self, flavors: &[Flavor]) -> StoreResult<()>;

    // Fillings
    fn list_fillings(&self) -> StoreResult<Vec<Filling>>;
    fn insert_filling(&self, filling: &Filling) -> StoreResult<i64>;
    fn update_filling(&self, filling: &Filling) -> StoreResult<()>;
    fn delete_filling(&self, id: i64) -> StoreResult<()>;
    fn replace_fillings(&self, fillings: &[Filling]) -> StoreResult<()>;

    // Settings (a single record)
    fn get_settings(&self) -> StoreResult<Option<ShopSettings>>;
    fn put_settings(&self, settings: &ShopSettings) -> StoreResult<()>;

    // String-keyed blob table
    fn get_blob(&self, key: &str) -> StoreResult<Option<String>>;
    fn put_blob(&self, key: &str, value: &str) -> StoreResult<()>;
    fn delete_blob(&self, key: &str) -> StoreResult<()>;
}

/// Opens the store selected by the configuration.
pub fn open_store(config: &StorageConfig) -> StoreResult<Arc<dyn LocalStore>> {
    match config.engine {
        StorageEngine::Sqlite => {
            let path = config.database_path();
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::warn!("could not create data directory {}: {}", parent.display(), e);
                }
            }
            Ok(Arc::new(SqliteStore::open(&path)?))
        }
        StorageEngine::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
