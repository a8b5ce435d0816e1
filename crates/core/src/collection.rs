// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synced collections and their reconciliation policies.
//!
//! The engine syncs four collections. Orders are transactional records and
//! merge by id; flavors, fillings, and settings are reference data for which
//! the remote store is the single source of truth. The asymmetry is encoded
//! once, in [`Collection::policy`], rather than branched per call site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A synced collection of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Customer orders with delivery dates.
    Orders,
    /// Catalog of cake flavors.
    Flavors,
    /// Catalog of fillings.
    Fillings,
    /// Per-shop settings (a single document per owner).
    Settings,
}

impl Collection {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::Flavors => "flavors",
            Collection::Fillings => "fillings",
            Collection::Settings => "settings",
        }
    }

    /// All synced collections, in drain/display order.
    pub fn all() -> [Collection; 4] {
        [
            Collection::Orders,
            Collection::Flavors,
            Collection::Fillings,
            Collection::Settings,
        ]
    }

    /// How local and remote copies of this collection are reconciled.
    pub fn policy(&self) -> ReconciliationPolicy {
        match self {
            Collection::Orders => ReconciliationPolicy::MergeById,
            Collection::Flavors => ReconciliationPolicy::RemoteWins,
            Collection::Fillings => ReconciliationPolicy::RemoteWins,
            Collection::Settings => ReconciliationPolicy::RemoteWins,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "orders" => Ok(Collection::Orders),
            "flavors" => Ok(Collection::Flavors),
            "fillings" => Ok(Collection::Fillings),
            "settings" => Ok(Collection::Settings),
            _ => Err(Error::InvalidCollection(s.to_string())),
        }
    }
}

/// Per-collection reconciliation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationPolicy {
    /// Remote records are merged into the local store keyed by local id;
    /// local-only records survive.
    MergeById,
    /// The remote result replaces the local copy entirely. An empty remote
    /// result means "no data yet", not a reason to keep stale local state.
    RemoteWins,
}

/// The kind of mutation carried by a pending sync item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    /// Returns the string representation used in storage and item ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::Create => "create",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(SyncOperation::Create),
            "update" => Ok(SyncOperation::Update),
            "delete" => Ok(SyncOperation::Delete),
            _ => Err(Error::InvalidOperation(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
