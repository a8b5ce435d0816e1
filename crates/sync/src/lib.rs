// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gn-sync: offline-first synchronization engine for the ganache order app.
//!
//! The engine keeps the app fully usable with no connectivity: every write
//! lands in the local store first, is mirrored to the remote document store
//! when online, and is queued durably when not. Reconnecting drains the
//! queue with bounded retries.
//!
//! # Architecture
//!
//! ```text
//! application
//!      │
//!      ▼
//! ┌──────────────┐   writes    ┌──────────────┐
//! │ HybridStore  │────────────►│  LocalStore  │  (sqlite or memory)
//! │   (facade)   │             └──────────────┘
//! └──────┬───────┘
//!        │ mirror (online: direct / offline: enqueue)
//!        ▼
//! ┌──────────────┐   drain     ┌──────────────┐   requests   ┌────────┐
//! │ Coordinator  │────────────►│  SyncClient  │─────────────►│ remote │
//! │  + SyncQueue │             │ (transport)  │              │ store  │
//! └──────▲───────┘             └──────────────┘              └────────┘
//!        │ offline→online edge
//! ┌──────┴───────┐
//! │ Connectivity │◄── platform signals
//! │   Monitor    │
//! └──────────────┘
//! ```
//!
//! The application's composition root constructs the pieces explicitly:
//! open a [`store::LocalStore`], build a [`remote::RemoteSyncClient`], wrap
//! both in a [`coordinator::SyncCoordinator`], subscribe the coordinator to
//! a [`connectivity::ConnectivityMonitor`], and hand the
//! [`facade::HybridStore`] to the UI layer.

pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod error;
pub mod facade;
pub mod images;
pub mod queue;
pub mod remote;
pub mod store;

pub use config::{RemoteConfig, Settings, StorageConfig, StorageEngine};
pub use connectivity::{ConnectivityMonitor, ConnectivityStatus, NetSignal, TransportKind};
pub use coordinator::{DrainReport, QueueStatus, SyncCoordinator};
pub use error::{Error, Result};
pub use facade::{HybridStore, OrderDraft, PullReport};
pub use queue::{FailureLog, SyncQueue, TerminalFailure};
pub use remote::{RemoteSyncClient, SyncError, Transport, WebSocketTransport};
pub use store::{LocalStore, MemoryStore, SqliteStore};
