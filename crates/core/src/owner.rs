// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Owner identity for scoping remote records.
//!
//! Every remote document belongs to exactly one owner. The identity is
//! normally issued by the remote's anonymous sign-in; when sign-in is
//! unavailable the engine falls back to a pre-shared constant so that sync
//! never blocks on identity resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback identity used when anonymous sign-in fails.
///
/// All devices that could not obtain a dynamic identity share this scope.
pub const SHARED_OWNER_ID: &str = "shared-device";

/// The stable identifier all remote records are scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Creates an owner identity from a server-issued string.
    pub fn new(id: impl Into<String>) -> Self {
        OwnerId(id.into())
    }

    /// The pre-shared fallback identity.
    pub fn shared() -> Self {
        OwnerId(SHARED_OWNER_ID.to_string())
    }

    /// Returns true if this is the shared fallback identity.
    pub fn is_shared(&self) -> bool {
        self.0 == SHARED_OWNER_ID
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        OwnerId(s.to_string())
    }
}

#[cfg(test)]
#[path = "owner_tests.rs"]
mod tests;
