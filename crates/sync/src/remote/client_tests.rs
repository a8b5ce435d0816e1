// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the remote sync client.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;

use gn_core::model::to_document;
use gn_core::{Collection, Order, OwnerId, PendingSyncItem, SyncOperation};

use super::client::{RemoteSyncClient, SyncError};
use super::transport_tests::{MockRemote, MockTransport};
use crate::config::RemoteConfig;

fn make_client() -> (RemoteSyncClient<MockTransport>, Arc<MockRemote>) {
    let mut config = RemoteConfig::for_url("ws://mock");
    config.request_timeout_ms = 1_000;
    let transport = MockTransport::new();
    let remote = transport.remote();
    (RemoteSyncClient::with_transport(&config, transport), remote)
}

fn make_order(id: i64, customer: &str, day: u32, price: f64, hour: u32) -> Order {
    Order {
        id,
        customer: customer.to_string(),
        flavor: "chocolate".to_string(),
        filling: "raspberry".to_string(),
        price,
        delivery_date: NaiveDate::from_ymd_opt(2026, 6, day).unwrap(),
        notes: None,
        image_url: None,
        created_at: Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap(),
    }
}

fn seed_order(remote: &MockRemote, key: &str, order: &Order) {
    let doc = to_document(order, &OwnerId::shared()).unwrap();
    remote.seed(Collection::Orders, key, doc);
}

#[tokio::test]
async fn test_sign_in_issues_identity() {
    let (mut client, _remote) = make_client();
    assert!(client.owner().is_shared());

    let owner = client.sign_in().await;
    assert!(!owner.is_shared());
    assert_eq!(owner.as_str(), "anon-1");
    assert_eq!(client.owner(), &owner);
}

#[tokio::test]
async fn test_sign_in_rejection_falls_back_to_shared() {
    let (mut client, remote) = make_client();
    remote.set_fail_sign_in(true);

    let owner = client.sign_in().await;
    assert!(owner.is_shared());
}

#[tokio::test]
async fn test_sign_in_network_failure_falls_back_to_shared() {
    let (mut client, remote) = make_client();
    remote.set_fail_requests(true);

    let owner = client.sign_in().await;
    assert!(owner.is_shared());
}

#[tokio::test]
async fn test_apply_create_is_idempotent() {
    let (mut client, remote) = make_client();
    let order = make_order(7, "Marta", 14, 45.0, 9);
    let item = PendingSyncItem::new(
        SyncOperation::Create,
        Collection::Orders,
        serde_json::to_value(&order).unwrap(),
    );

    client.apply(&item).await.unwrap();
    client.apply(&item).await.unwrap();

    // Same key both times: one record, not two
    assert_eq!(remote.count(Collection::Orders), 1);
    let doc = remote.doc(Collection::Orders, "shared-device_7").unwrap();
    assert_eq!(doc["customer"], "Marta");
    assert_eq!(doc["owner_id"], "shared-device");
}

#[tokio::test]
async fn test_apply_update_replaces_document() {
    let (mut client, remote) = make_client();
    let mut order = make_order(7, "Marta", 14, 100.0, 9);
    let create = PendingSyncItem::new(
        SyncOperation::Create,
        Collection::Orders,
        serde_json::to_value(&order).unwrap(),
    );
    client.apply(&create).await.unwrap();

    order.price = 120.0;
    order.notes = None;
    let update = PendingSyncItem::new(
        SyncOperation::Update,
        Collection::Orders,
        serde_json::to_value(&order).unwrap(),
    );
    client.apply(&update).await.unwrap();

    let doc = remote.doc(Collection::Orders, "shared-device_7").unwrap();
    assert_eq!(doc["price"], 120.0);
    assert_eq!(remote.count(Collection::Orders), 1);
}

#[tokio::test]
async fn test_apply_delete() {
    let (mut client, remote) = make_client();
    seed_order(&remote, "shared-device_7", &make_order(7, "Marta", 14, 45.0, 9));

    let item = PendingSyncItem::new(
        SyncOperation::Delete,
        Collection::Orders,
        json!({ "id": 7 }),
    );
    client.apply(&item).await.unwrap();
    assert_eq!(remote.count(Collection::Orders), 0);

    // Deleting again succeeds (idempotent)
    client.apply(&item).await.unwrap();
}

#[tokio::test]
async fn test_apply_without_id_is_rejected() {
    let (mut client, _remote) = make_client();
    let item = PendingSyncItem::new(
        SyncOperation::Create,
        Collection::Orders,
        json!({ "customer": "Marta" }),
    );
    let err = client.apply(&item).await.unwrap_err();
    assert!(matches!(err, SyncError::Rejected(_)));
}

#[tokio::test]
async fn test_apply_settings_uses_owner_key() {
    let (mut client, remote) = make_client();
    let item = PendingSyncItem::new(
        SyncOperation::Update,
        Collection::Settings,
        json!({ "shop_name": "Dulce", "currency": "EUR", "lead_time_days": 2,
                "updated_at": "2026-05-01T09:00:00Z" }),
    );
    client.apply(&item).await.unwrap();
    assert!(remote.doc(Collection::Settings, "shared-device").is_some());
}

#[tokio::test]
async fn test_fetch_orders_sorted_and_tolerant() {
    let (mut client, remote) = make_client();
    seed_order(&remote, "shared-device_2", &make_order(2, "late", 20, 30.0, 9));
    seed_order(&remote, "shared-device_1", &make_order(1, "early", 2, 30.0, 9));
    // A document that no longer matches the record shape is skipped
    remote.seed(
        Collection::Orders,
        "shared-device_junk",
        json!({ "owner_id": "shared-device", "legacy": true }),
    );

    let orders = client.fetch_orders().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].customer, "early");
    assert_eq!(orders[1].customer, "late");
}

#[tokio::test]
async fn test_fetch_order_by_id() {
    let (mut client, remote) = make_client();
    seed_order(&remote, "shared-device_7", &make_order(7, "Marta", 14, 45.0, 9));

    let order = client.fetch_order(7).await.unwrap().unwrap();
    assert_eq!(order.customer, "Marta");
    assert!(client.fetch_order(8).await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_settings_none_when_absent() {
    let (mut client, _remote) = make_client();
    assert!(client.fetch_settings().await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_counts_as_failure_and_resets_connection() {
    let (mut client, remote) = make_client();
    // First request succeeds so the transport is connected
    let order = make_order(1, "Marta", 14, 45.0, 9);
    let item = PendingSyncItem::new(
        SyncOperation::Create,
        Collection::Orders,
        serde_json::to_value(&order).unwrap(),
    );
    client.apply(&item).await.unwrap();
    assert!(client.is_connected());

    // Next request never answers; the bounded wait elapses
    let _gate = remote.hold_next_request();
    let err = client.apply(&item).await.unwrap_err();
    assert!(matches!(err, SyncError::Timeout));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_push_orders_uploads_all() {
    let (mut client, remote) = make_client();
    let orders = vec![
        make_order(1, "a", 1, 10.0, 9),
        make_order(2, "b", 2, 20.0, 9),
    ];
    assert_eq!(client.push_orders(&orders).await.unwrap(), 2);
    assert_eq!(remote.count(Collection::Orders), 2);
}

#[tokio::test]
async fn test_dedupe_removes_exact_id_duplicates_keeping_latest() {
    let (mut client, remote) = make_client();

    // Three documents describing order 7 under different keys (legacy
    // uploads with random keys); hours 8, 11, 9 — 11:00 is the latest.
    seed_order(&remote, "legacy-a", &make_order(7, "Marta", 14, 45.0, 8));
    seed_order(&remote, "legacy-b", &make_order(7, "Marta", 14, 45.0, 11));
    seed_order(&remote, "legacy-c", &make_order(7, "Marta", 14, 45.0, 9));

    let deleted = client.dedupe_orders().await.unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(remote.count(Collection::Orders), 1);
    assert!(remote.doc(Collection::Orders, "legacy-b").is_some());
}

#[tokio::test]
async fn test_dedupe_removes_content_duplicates_after_id_pass() {
    let (mut client, remote) = make_client();

    // Different ids, same name|deliveryDate|price content; 10:00 is latest
    seed_order(&remote, "shared-device_1", &make_order(1, "Iris", 3, 25.0, 7));
    seed_order(&remote, "shared-device_2", &make_order(2, "Iris", 3, 25.0, 10));
    // Unrelated order survives
    seed_order(&remote, "shared-device_3", &make_order(3, "Noa", 4, 30.0, 7));

    let deleted = client.dedupe_orders().await.unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(remote.count(Collection::Orders), 2);
    assert!(remote.doc(Collection::Orders, "shared-device_2").is_some());
    assert!(remote.doc(Collection::Orders, "shared-device_3").is_some());
}

#[tokio::test]
async fn test_dedupe_is_idempotent() {
    let (mut client, remote) = make_client();
    seed_order(&remote, "legacy-a", &make_order(7, "Marta", 14, 45.0, 8));
    seed_order(&remote, "legacy-b", &make_order(7, "Marta", 14, 45.0, 11));
    seed_order(&remote, "shared-device_2", &make_order(2, "Iris", 3, 25.0, 10));

    let first = client.dedupe_orders().await.unwrap();
    assert_eq!(first, 1);

    // Second consecutive run deletes nothing
    let second = client.dedupe_orders().await.unwrap();
    assert_eq!(second, 0);
}
