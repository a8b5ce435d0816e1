// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use chrono::TimeZone;

fn make_order(id: i64) -> Order {
    Order {
        id,
        customer: "Marta".to_string(),
        flavor: "chocolate".to_string(),
        filling: "raspberry".to_string(),
        price: 45.0,
        delivery_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        notes: None,
        image_url: None,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
    }
}

#[test]
fn test_content_key_format() {
    let order = make_order(7);
    assert_eq!(order.content_key(), "Marta|2026-03-14|45.00");
}

#[test]
fn test_content_key_ignores_id() {
    let a = make_order(1);
    let b = make_order(2);
    assert_eq!(a.content_key(), b.content_key());
}

#[test]
fn test_doc_key_combines_owner_and_id() {
    let owner = OwnerId::new("anon-9");
    assert_eq!(doc_key(&owner, 7), "anon-9_7");
}

#[test]
fn test_to_document_stamps_owner() {
    let owner = OwnerId::new("anon-9");
    let doc = to_document(&make_order(7), &owner).unwrap();
    assert_eq!(doc["owner_id"], "anon-9");
    assert_eq!(doc["id"], 7);
    assert_eq!(doc["customer"], "Marta");
}

#[test]
fn test_from_document_ignores_owner_field() {
    let owner = OwnerId::new("anon-9");
    let doc = to_document(&make_order(7), &owner).unwrap();
    let back: Order = from_document(doc).unwrap();
    assert_eq!(back, make_order(7));
}

#[test]
fn test_to_document_rejects_non_object() {
    let owner = OwnerId::new("anon-9");
    let err = to_document(&42u32, &owner).unwrap_err();
    assert!(err.to_string().contains("object"));
}

#[test]
fn test_local_id_of_reads_id() {
    let owner = OwnerId::shared();
    let doc = to_document(&make_order(12), &owner).unwrap();
    assert_eq!(local_id_of(&doc).unwrap(), 12);
}

#[test]
fn test_local_id_of_missing() {
    let doc = serde_json::json!({ "customer": "Marta" });
    assert!(local_id_of(&doc).is_err());
}

#[test]
fn test_updated_at_of_parses_rfc3339() {
    let owner = OwnerId::shared();
    let doc = to_document(&make_order(1), &owner).unwrap();
    let parsed = updated_at_of(&doc).unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
}

#[test]
fn test_updated_at_of_absent_is_none() {
    let doc = serde_json::json!({ "id": 1 });
    assert!(updated_at_of(&doc).is_none());
}

#[test]
fn test_settings_default_is_epoch() {
    let settings = ShopSettings::default();
    assert_eq!(settings.updated_at, DateTime::<Utc>::UNIX_EPOCH);
    assert_eq!(settings.currency, "EUR");
}
