// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for the remote document store.
//!
//! The protocol is lock-step: the client sends a request and the server
//! answers with exactly one response. Documents are JSON objects addressed
//! by (collection, key); queries are scoped to one owner and ordered by a
//! single field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::Collection;

/// A document together with its remote key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDoc {
    /// The key the document is stored under.
    pub key: String,
    /// The document body.
    pub data: Value,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request an anonymous identity.
    ///
    /// The server issues a stable owner id for this device.
    SignIn,

    /// Write a document, replacing any existing one under the same key.
    ///
    /// Set is an upsert: repeated delivery of the same document is a no-op
    /// apart from the write itself.
    Set {
        collection: Collection,
        key: String,
        doc: Value,
    },

    /// Shallow-merge fields into an existing document.
    Update {
        collection: Collection,
        key: String,
        doc: Value,
    },

    /// Delete a document. Deleting a missing document succeeds.
    Delete { collection: Collection, key: String },

    /// Fetch a single document.
    Get { collection: Collection, key: String },

    /// Fetch all documents in a collection belonging to one owner,
    /// optionally ordered by a field (ascending).
    Query {
        collection: Collection,
        owner_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order_by: Option<String>,
    },

    /// Ping message for keepalive.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Response to SignIn: the issued owner identity.
    Identity { owner_id: String },

    /// Acknowledges a Set, Update, or Delete.
    Ack,

    /// Response to Get.
    Doc {
        /// The document, or None if no document exists under the key.
        doc: Option<Value>,
    },

    /// Response to Query.
    Docs { docs: Vec<RemoteDoc> },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// The request was rejected.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a SignIn message.
    pub fn sign_in() -> Self {
        ClientMessage::SignIn
    }

    /// Creates a Set message.
    pub fn set(collection: Collection, key: impl Into<String>, doc: Value) -> Self {
        ClientMessage::Set {
            collection,
            key: key.into(),
            doc,
        }
    }

    /// Creates an Update message.
    pub fn update(collection: Collection, key: impl Into<String>, doc: Value) -> Self {
        ClientMessage::Update {
            collection,
            key: key.into(),
            doc,
        }
    }

    /// Creates a Delete message.
    pub fn delete(collection: Collection, key: impl Into<String>) -> Self {
        ClientMessage::Delete {
            collection,
            key: key.into(),
        }
    }

    /// Creates a Get message.
    pub fn get(collection: Collection, key: impl Into<String>) -> Self {
        ClientMessage::Get {
            collection,
            key: key.into(),
        }
    }

    /// Creates a Query message.
    pub fn query(
        collection: Collection,
        owner_id: impl Into<String>,
        order_by: Option<String>,
    ) -> Self {
        ClientMessage::Query {
            collection,
            owner_id: owner_id.into(),
            order_by,
        }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Identity message.
    pub fn identity(owner_id: impl Into<String>) -> Self {
        ServerMessage::Identity {
            owner_id: owner_id.into(),
        }
    }

    /// Creates an Ack message.
    pub fn ack() -> Self {
        ServerMessage::Ack
    }

    /// Creates a Doc message.
    pub fn doc(doc: Option<Value>) -> Self {
        ServerMessage::Doc { doc }
    }

    /// Creates a Docs message.
    pub fn docs(docs: Vec<RemoteDoc>) -> Self {
        ServerMessage::Docs { docs }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
