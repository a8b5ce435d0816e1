// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Handles client connections and request/response routing. The protocol
//! is lock-step: every client message gets exactly one response, so each
//! connection is served by a simple receive-handle-reply loop.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

use gn_core::protocol::{ClientMessage, ServerMessage};

use crate::state::ServerState;

/// Run the WebSocket server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    loop {
        match ws_stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let response = match handle_client_message(&text, &state).await {
                    Ok(response) => response,
                    Err(e) => ServerMessage::error(e.to_string()),
                };
                let json = response.to_json()?;
                ws_sink.send(Message::Text(json.into())).await?;
            }
            Some(Ok(Message::Close(_))) => {
                info!("Client {} disconnected", peer_addr);
                break;
            }
            Some(Ok(Message::Ping(data))) => {
                ws_sink.send(Message::Pong(data)).await?;
            }
            Some(Ok(_)) => {
                // Ignore other message types (Binary, Pong, Frame)
            }
            Some(Err(e)) => {
                error!("WebSocket error from {}: {}", peer_addr, e);
                break;
            }
            None => {
                info!("Client {} stream ended", peer_addr);
                break;
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process a client message and produce its response.
pub(crate) async fn handle_client_message(
    text: &str,
    state: &ServerState,
) -> Result<ServerMessage, Box<dyn std::error::Error + Send + Sync>> {
    let msg = ClientMessage::from_json(text)?;
    debug!("Received message: {:?}", msg);

    match msg {
        ClientMessage::SignIn => {
            let owner_id = state.sign_in();
            debug!("Issued identity {}", owner_id);
            Ok(ServerMessage::identity(owner_id))
        }

        ClientMessage::Set {
            collection,
            key,
            doc,
        } => {
            if !doc.is_object() {
                return Ok(ServerMessage::error("document must be a JSON object"));
            }
            state.set(collection, key, doc).await;
            Ok(ServerMessage::ack())
        }

        ClientMessage::Update {
            collection,
            key,
            doc,
        } => {
            if !doc.is_object() {
                return Ok(ServerMessage::error("document must be a JSON object"));
            }
            state.update(collection, key, doc).await;
            Ok(ServerMessage::ack())
        }

        ClientMessage::Delete { collection, key } => {
            state.delete(collection, &key).await;
            Ok(ServerMessage::ack())
        }

        ClientMessage::Get { collection, key } => {
            let doc = state.get(collection, &key).await;
            Ok(ServerMessage::doc(doc))
        }

        ClientMessage::Query {
            collection,
            owner_id,
            order_by,
        } => {
            let docs = state.query(collection, &owner_id, order_by.as_deref()).await;
            debug!("Query {}/{}: {} docs", collection, owner_id, docs.len());
            Ok(ServerMessage::docs(docs))
        }

        ClientMessage::Ping { id } => {
            debug!("Ping received: {}", id);
            Ok(ServerMessage::pong(id))
        }
    }
}
