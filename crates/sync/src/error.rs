// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sync engine.
//!
//! Local-store failures are the only fatal class on the write path: the
//! local store is the durability baseline, so its errors propagate to the
//! caller. Remote failures never do — they are queued and retried.

use thiserror::Error;

use crate::queue::QueueError;
use crate::remote::SyncError;
use crate::store::StoreError;

/// All possible errors that can occur in gn-sync operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("remote sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("order not found: {0}")]
    OrderNotFound(i64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Core(#[from] gn_core::Error),
}

/// A specialized Result type for gn-sync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
