// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for gn-core operations.

use thiserror::Error;

/// All possible errors that can occur in gn-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid collection: '{0}'\n  hint: valid collections are: orders, flavors, fillings, settings")]
    InvalidCollection(String),

    #[error("invalid sync operation: '{0}'\n  hint: valid operations are: create, update, delete")]
    InvalidOperation(String),

    #[error("document is missing field '{0}'")]
    MissingField(&'static str),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for gn-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
