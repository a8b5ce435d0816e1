// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;

#[test]
fn test_shared_owner_is_constant() {
    let owner = OwnerId::shared();
    assert!(owner.is_shared());
    assert_eq!(owner.as_str(), SHARED_OWNER_ID);
}

#[test]
fn test_issued_owner_is_not_shared() {
    let owner = OwnerId::new("anon-1234");
    assert!(!owner.is_shared());
    assert_eq!(owner.to_string(), "anon-1234");
}

#[test]
fn test_owner_serializes_transparently() {
    let owner = OwnerId::new("anon-1234");
    let json = serde_json::to_string(&owner).unwrap();
    assert_eq!(json, "\"anon-1234\"");

    let back: OwnerId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, owner);
}
