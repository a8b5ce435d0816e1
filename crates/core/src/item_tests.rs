// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use serde_json::json;
use std::collections::HashSet;

#[test]
fn test_new_item_starts_with_zero_retries() {
    let item = PendingSyncItem::new(
        SyncOperation::Create,
        Collection::Orders,
        json!({ "id": 7 }),
    );
    assert_eq!(item.retry_count, 0);
    assert_eq!(item.operation, SyncOperation::Create);
    assert_eq!(item.collection, Collection::Orders);
}

#[test]
fn test_item_id_names_collection_and_operation() {
    let item = PendingSyncItem::new(
        SyncOperation::Update,
        Collection::Flavors,
        json!({ "id": 1 }),
    );
    assert!(item.id.starts_with("flavors-update-"));
}

#[test]
fn test_item_ids_are_unique() {
    let mut seen = HashSet::new();
    for _ in 0..100 {
        let item = PendingSyncItem::new(
            SyncOperation::Create,
            Collection::Orders,
            json!({ "id": 1 }),
        );
        assert!(seen.insert(item.id));
    }
}

#[test]
fn test_local_id_reads_payload() {
    let item = PendingSyncItem::new(
        SyncOperation::Delete,
        Collection::Orders,
        json!({ "id": 42 }),
    );
    assert_eq!(item.local_id(), Some(42));
}

#[test]
fn test_local_id_missing() {
    let item = PendingSyncItem::new(SyncOperation::Create, Collection::Settings, json!({}));
    assert_eq!(item.local_id(), None);
}

#[test]
fn test_item_round_trips_through_json() {
    let item = PendingSyncItem::new(
        SyncOperation::Update,
        Collection::Orders,
        json!({ "id": 7, "price": 120.0 }),
    );
    let json = serde_json::to_string(&item).unwrap();
    let back: PendingSyncItem = serde_json::from_str(&json).unwrap();
    assert_eq!(back, item);
}
