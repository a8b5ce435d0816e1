// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory local store.
//!
//! Used by tests and by environments without a writable filesystem. Keeps
//! the same semantics as the SQLite store: assigned ids are monotonically
//! increasing, deletes are idempotent, updates of missing records fail.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use gn_core::{Filling, Flavor, Order, ShopSettings};

use super::{LocalStore, StoreError, StoreResult};

#[derive(Default)]
struct MemoryInner {
    orders: BTreeMap<i64, Order>,
    next_order_id: i64,
    flavors: BTreeMap<i64, Flavor>,
    next_flavor_id: i64,
    fillings: BTreeMap<i64, Filling>,
    next_filling_id: i64,
    settings: Option<ShopSettings>,
    blobs: BTreeMap<String, String>,
}

fn assign_id(requested: i64, next: &mut i64) -> i64 {
    if requested > 0 {
        *next = (*next).max(requested);
        requested
    } else {
        *next += 1;
        *next
    }
}

/// In-memory implementation of [`LocalStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocalStore for MemoryStore {
    fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let inner = self.lock();
        let mut orders: Vec<Order> = inner.orders.values().cloned().collect();
        orders.sort_by(|a, b| (a.delivery_date, a.id).cmp(&(b.delivery_date, b.id)));
        Ok(orders)
    }

    fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    fn insert_order(&self, order: &Order) -> StoreResult<i64> {
        let mut inner = self.lock();
        let id = assign_id(order.id, &mut inner.next_order_id);
        let mut order = order.clone();
        order.id = id;
        inner.orders.insert(id, order);
        Ok(id)
    }

    fn update_order(&self, order: &Order) -> StoreResult<()> {
        let mut inner = self.lock();
        if !inner.orders.contains_key(&order.id) {
            return Err(StoreError::NotFound {
                collection: "orders",
                id: order.id,
            });
        }
        inner.orders.insert(order.id, order.clone());
        Ok(())
    }

    fn delete_order(&self, id: i64) -> StoreResult<()> {
        self.lock().orders.remove(&id);
        Ok(())
    }

    fn upsert_order(&self, order: &Order) -> StoreResult<()> {
        let mut inner = self.lock();
        let id = assign_id(order.id, &mut inner.next_order_id);
        let mut order = order.clone();
        order.id = id;
        inner.orders.insert(id, order);
        Ok(())
    }

    fn list_flavors(&self) -> StoreResult<Vec<Flavor>> {
        let inner = self.lock();
        let mut flavors: Vec<Flavor> = inner.flavors.values().cloned().collect();
        flavors.sort_by(|a, b| (a.name.clone(), a.id).cmp(&(b.name.clone(), b.id)));
        Ok(flavors)
    }

    fn insert_flavor(&self, flavor: &Flavor) -> StoreResult<i64> {
        let mut inner = self.lock();
        let id = assign_id(flavor.id, &mut inner.next_flavor_id);
        let mut flavor = flavor.clone();
        flavor.id = id;
        inner.flavors.insert(id, flavor);
        Ok(id)
    }

    fn update_flavor(&self, flavor: &Flavor) -> StoreResult<()> {
        let mut inner = self.lock();
        if !inner.flavors.contains_key(&flavor.id) {
            return Err(StoreError::NotFound {
                collection: "flavors",
                id: flavor.id,
            });
        }
        inner.flavors.insert(flavor.id, flavor.clone());
        Ok(())
    }

    fn delete_flavor(&self, id: i64) -> StoreResult<()> {
        self.lock().flavors.remove(&id);
        Ok(())
    }

    fn replace_flavors(&self, flavors: &[Flavor]) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.flavors = flavors.iter().map(|f| (f.id, f.clone())).collect();
        let max_id = inner.flavors.keys().max().copied().unwrap_or(0);
        inner.next_flavor_id = inner.next_flavor_id.max(max_id);
        Ok(())
    }

    fn list_fillings(&self) -> StoreResult<Vec<Filling>> {
        let inner = self.lock();
        let mut fillings: Vec<Filling> = inner.fillings.values().cloned().collect();
        fillings.sort_by(|a, b| (a.name.clone(), a.id).cmp(&(b.name.clone(), b.id)));
        Ok(fillings)
    }

    fn insert_filling(&self, filling: &Filling) -> StoreResult<i64> {
        let mut inner = self.lock();
        let id = assign_id(filling.id, &mut inner.next_filling_id);
        let mut filling = filling.clone();
        filling.id = id;
        inner.fillings.insert(id, filling);
        Ok(id)
    }

    fn update_filling(&self, filling: &Filling) -> StoreResult<()> {
        let mut inner = self.lock();
        if !inner.fillings.contains_key(&filling.id) {
            return Err(StoreError::NotFound {
                collection: "fillings",
                id: filling.id,
            });
        }
        inner.fillings.insert(filling.id, filling.clone());
        Ok(())
    }

    fn delete_filling(&self, id: i64) -> StoreResult<()> {
        self.lock().fillings.remove(&id);
        Ok(())
    }

    fn replace_fillings(&self, fillings: &[Filling]) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.fillings = fillings.iter().map(|f| (f.id, f.clone())).collect();
        let max_id = inner.fillings.keys().max().copied().unwrap_or(0);
        inner.next_filling_id = inner.next_filling_id.max(max_id);
        Ok(())
    }

    fn get_settings(&self) -> StoreResult<Option<ShopSettings>> {
        Ok(self.lock().settings.clone())
    }

    fn put_settings(&self, settings: &ShopSettings) -> StoreResult<()> {
        self.lock().settings = Some(settings.clone());
        Ok(())
    }

    fn get_blob(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().blobs.get(key).cloned())
    }

    fn put_blob(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock().blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_blob(&self, key: &str) -> StoreResult<()> {
        self.lock().blobs.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
