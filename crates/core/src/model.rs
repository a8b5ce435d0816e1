// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record types for the order-management domain.
//!
//! These are the documents the engine keeps in the local store and mirrors
//! to the remote document store. Remote documents carry two extra fields on
//! top of the canonical ones: `owner_id` (the identity scope) and
//! `updated_at` (used for last-write-wins and duplicate reconciliation).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::owner::OwnerId;

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Local numeric id. Combined with the owner identity it forms the
    /// merge key for remote records.
    pub id: i64,
    /// Customer name.
    pub customer: String,
    /// Chosen flavor name.
    pub flavor: String,
    /// Chosen filling name.
    pub filling: String,
    /// Agreed price.
    pub price: f64,
    /// Date the order is due.
    pub delivery_date: NaiveDate,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// URL of the reference photo, once uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Content-based duplicate key: `name|deliveryDate|price`.
    ///
    /// Two orders with the same key are considered the same order for the
    /// second pass of duplicate reconciliation, regardless of their ids.
    pub fn content_key(&self) -> String {
        format!("{}|{}|{:.2}", self.customer, self.delivery_date, self.price)
    }
}

/// A catalog flavor. Reference data: the remote store is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: i64,
    pub name: String,
    /// Surcharge over the base price, if any.
    #[serde(default)]
    pub price: f64,
    pub updated_at: DateTime<Utc>,
}

/// A catalog filling. Reference data: the remote store is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filling {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    pub updated_at: DateTime<Utc>,
}

/// Per-shop settings. A single document per owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSettings {
    pub shop_name: String,
    /// ISO 4217 currency code used for display.
    pub currency: String,
    /// Minimum days of notice before a delivery date.
    pub lead_time_days: u32,
    pub updated_at: DateTime<Utc>,
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            shop_name: String::new(),
            currency: "EUR".to_string(),
            lead_time_days: 2,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Bookkeeping for a reference photo attached to an order.
///
/// Image uploads travel through their own best-effort pipeline and are
/// never placed on the sync queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReference {
    pub order_id: i64,
    /// Path of the photo on the device.
    pub local_path: String,
    /// URL returned by the image host, once uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    pub uploaded: bool,
    pub created_at: DateTime<Utc>,
}

/// Remote document key for a record: `{owner}_{local_id}`.
///
/// Deterministic keys make repeated delivery of the same mutation an
/// upsert instead of a duplicate insert.
pub fn doc_key(owner: &OwnerId, local_id: i64) -> String {
    format!("{}_{}", owner.as_str(), local_id)
}

/// Serializes a record into a remote document, stamping `owner_id`.
pub fn to_document<T: Serialize>(record: &T, owner: &OwnerId) -> Result<Value> {
    let mut doc = serde_json::to_value(record)?;
    match doc.as_object_mut() {
        Some(map) => {
            map.insert("owner_id".to_string(), Value::String(owner.to_string()));
            Ok(doc)
        }
        None => Err(Error::CorruptedData(
            "record did not serialize to an object".to_string(),
        )),
    }
}

/// Deserializes a record from a remote document.
///
/// Extra fields such as `owner_id` are ignored.
pub fn from_document<T: for<'de> Deserialize<'de>>(doc: Value) -> Result<T> {
    Ok(serde_json::from_value(doc)?)
}

/// Reads the local numeric id out of a document.
pub fn local_id_of(doc: &Value) -> Result<i64> {
    doc.get("id")
        .and_then(Value::as_i64)
        .ok_or(Error::MissingField("id"))
}

/// Reads the `updated_at` timestamp out of a document, if parseable.
pub fn updated_at_of(doc: &Value) -> Option<DateTime<Utc>> {
    let raw = doc.get("updated_at")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
