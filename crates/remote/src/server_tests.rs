// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for server message handling.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use serde_json::json;

use gn_core::protocol::{ClientMessage, ServerMessage};
use gn_core::Collection;

use crate::server::handle_client_message;
use crate::state::ServerState;

async fn send(state: &ServerState, msg: ClientMessage) -> ServerMessage {
    handle_client_message(&msg.to_json().unwrap(), state)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_sign_in_issues_distinct_identities() {
    let state = ServerState::new();

    let first = send(&state, ClientMessage::sign_in()).await;
    let second = send(&state, ClientMessage::sign_in()).await;

    let (ServerMessage::Identity { owner_id: a }, ServerMessage::Identity { owner_id: b }) =
        (first, second)
    else {
        unreachable!("expected identity responses");
    };
    assert_ne!(a, b);
    assert!(a.starts_with("anon-"));
}

#[tokio::test]
async fn test_set_get_round_trip() {
    let state = ServerState::new();
    let doc = json!({ "id": 7, "owner_id": "anon-000001", "customer": "Marta" });

    let response = send(
        &state,
        ClientMessage::set(Collection::Orders, "anon-000001_7", doc.clone()),
    )
    .await;
    assert_eq!(response, ServerMessage::ack());

    let response = send(
        &state,
        ClientMessage::get(Collection::Orders, "anon-000001_7"),
    )
    .await;
    assert_eq!(response, ServerMessage::doc(Some(doc)));
}

#[tokio::test]
async fn test_set_is_an_upsert() {
    let state = ServerState::new();

    for price in [100.0, 120.0] {
        send(
            &state,
            ClientMessage::set(
                Collection::Orders,
                "a_7",
                json!({ "id": 7, "owner_id": "a", "price": price }),
            ),
        )
        .await;
    }

    let docs = state.query(Collection::Orders, "a", None).await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].data["price"], 120.0);
}

#[tokio::test]
async fn test_set_rejects_non_object() {
    let state = ServerState::new();
    let response = send(
        &state,
        ClientMessage::set(Collection::Orders, "a_1", json!(42)),
    )
    .await;
    assert!(matches!(response, ServerMessage::Error { .. }));
}

#[tokio::test]
async fn test_update_merges_fields() {
    let state = ServerState::new();
    send(
        &state,
        ClientMessage::set(
            Collection::Settings,
            "a",
            json!({ "owner_id": "a", "currency": "EUR", "lead_time_days": 2 }),
        ),
    )
    .await;
    send(
        &state,
        ClientMessage::update(Collection::Settings, "a", json!({ "lead_time_days": 4 })),
    )
    .await;

    let doc = state.get(Collection::Settings, "a").await.unwrap();
    assert_eq!(doc["currency"], "EUR");
    assert_eq!(doc["lead_time_days"], 4);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let state = ServerState::new();
    send(
        &state,
        ClientMessage::set(Collection::Orders, "a_1", json!({ "id": 1, "owner_id": "a" })),
    )
    .await;

    for _ in 0..2 {
        let response = send(&state, ClientMessage::delete(Collection::Orders, "a_1")).await;
        assert_eq!(response, ServerMessage::ack());
    }
    assert!(state.get(Collection::Orders, "a_1").await.is_none());
}

#[tokio::test]
async fn test_query_scopes_by_owner_and_orders_by_field() {
    let state = ServerState::new();
    state
        .set(
            Collection::Orders,
            "a_2".to_string(),
            json!({ "id": 2, "owner_id": "a", "delivery_date": "2026-07-20" }),
        )
        .await;
    state
        .set(
            Collection::Orders,
            "a_1".to_string(),
            json!({ "id": 1, "owner_id": "a", "delivery_date": "2026-07-02" }),
        )
        .await;
    state
        .set(
            Collection::Orders,
            "b_3".to_string(),
            json!({ "id": 3, "owner_id": "b", "delivery_date": "2026-07-01" }),
        )
        .await;

    let response = send(
        &state,
        ClientMessage::query(Collection::Orders, "a", Some("delivery_date".to_string())),
    )
    .await;

    let ServerMessage::Docs { docs } = response else {
        unreachable!("expected docs response");
    };
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].data["id"], 1);
    assert_eq!(docs[1].data["id"], 2);
}

#[tokio::test]
async fn test_ping_pong() {
    let state = ServerState::new();
    let response = send(&state, ClientMessage::ping(42)).await;
    assert_eq!(response, ServerMessage::pong(42));
}

#[tokio::test]
async fn test_malformed_message_is_an_error() {
    let state = ServerState::new();
    let result = handle_client_message("{not json", &state).await;
    assert!(result.is_err());
}
