// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote document-store access.
//!
//! Provides the client that delivers queued mutations and fetches
//! remote-authoritative data.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ RemoteSyncClient │────►│  Transport  │────►│   Remote    │
//! │                  │◄────│   (trait)   │◄────│    store    │
//! └──────────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Idempotent upserts keyed by `(owner, local id)`
//! - Anonymous sign-in with a pre-shared fallback identity
//! - Bounded per-request timeout (timeout counts as a network failure)
//! - Two-pass duplicate reconciliation for order records
//! - Injectable transport trait for testing

mod client;
mod transport;

pub use client::{RemoteSyncClient, SyncError, SyncResult};
pub use transport::{Transport, TransportError, TransportResult, WebSocketTransport};

#[cfg(test)]
mod client_tests;
