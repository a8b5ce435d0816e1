// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the gn-remote server binary.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Helper to spawn a server process and clean it up on drop.
struct ServerProcess {
    child: Child,
    port: u16,
}

impl ServerProcess {
    fn spawn() -> Self {
        // Use a port range that's less likely to conflict
        // Starting from a high ephemeral port
        let port = 49152 + (std::process::id() % 1000) as u16;

        let child = Command::new(env!("CARGO_BIN_EXE_gn-remote"))
            .arg("--bind")
            .arg(format!("127.0.0.1:{}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn server process");

        ServerProcess { child, port }
    }

    fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        // Kill the server process
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Connect with retries; CI runners can be slow to start the process.
async fn connect(server: &ServerProcess) -> WsStream {
    for _ in 0..20 {
        if let Ok(Ok((stream, _))) =
            tokio::time::timeout(Duration::from_millis(500), connect_async(&server.ws_url())).await
        {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    panic!("should connect to server within retries");
}

/// Send one request and wait for its response.
async fn round_trip(
    sink: &mut futures_util::stream::SplitSink<WsStream, Message>,
    stream: &mut futures_util::stream::SplitStream<WsStream>,
    request: serde_json::Value,
) -> String {
    sink.send(Message::Text(request.to_string().into()))
        .await
        .expect("send request");

    let response = tokio::time::timeout(Duration::from_secs(5), stream.next()).await;
    match response {
        Ok(Some(Ok(Message::Text(text)))) => text.to_string(),
        other => panic!("Expected text response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_lifecycle() {
    let server = ServerProcess::spawn();
    let ws_stream = connect(&server).await;
    let (mut sink, mut stream) = ws_stream.split();

    // Ping answers with a pong echoing the id
    let pong = round_trip(
        &mut sink,
        &mut stream,
        serde_json::json!({"type": "ping", "id": 12345}),
    )
    .await;
    assert!(pong.contains("pong"), "Expected pong, got: {}", pong);
    assert!(pong.contains("12345"), "Expected id 12345, got: {}", pong);

    // Server process is automatically killed when dropped
}

#[tokio::test]
async fn test_sign_in_and_document_round_trip() {
    let server = ServerProcess::spawn();
    let ws_stream = connect(&server).await;
    let (mut sink, mut stream) = ws_stream.split();

    let identity = round_trip(&mut sink, &mut stream, serde_json::json!({"type": "sign_in"})).await;
    assert!(identity.contains("anon-"), "Expected identity, got: {}", identity);

    let ack = round_trip(
        &mut sink,
        &mut stream,
        serde_json::json!({
            "type": "set",
            "collection": "orders",
            "key": "anon-000001_7",
            "doc": {"id": 7, "owner_id": "anon-000001", "customer": "Marta"},
        }),
    )
    .await;
    assert!(ack.contains("ack"), "Expected ack, got: {}", ack);

    let doc = round_trip(
        &mut sink,
        &mut stream,
        serde_json::json!({
            "type": "get",
            "collection": "orders",
            "key": "anon-000001_7",
        }),
    )
    .await;
    assert!(doc.contains("Marta"), "Expected stored doc, got: {}", doc);

    let docs = round_trip(
        &mut sink,
        &mut stream,
        serde_json::json!({
            "type": "query",
            "collection": "orders",
            "owner_id": "anon-000001",
            "order_by": "delivery_date",
        }),
    )
    .await;
    assert!(docs.contains("\"id\":7"), "Expected queried doc, got: {}", docs);
}
