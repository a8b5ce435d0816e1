// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local store.
//!
//! One connection guarded by a mutex; every call runs to completion before
//! the next, matching the engine's cooperative concurrency model.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use gn_core::{Filling, Flavor, Order, ShopSettings};

use super::{LocalStore, StoreError, StoreResult};

/// SQL schema for the order database.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer TEXT NOT NULL,
    flavor TEXT NOT NULL,
    filling TEXT NOT NULL,
    price REAL NOT NULL,
    delivery_date TEXT NOT NULL,
    notes TEXT,
    image_url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flavors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS fillings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

-- Single-row settings table
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    shop_name TEXT NOT NULL,
    currency TEXT NOT NULL,
    lead_time_days INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

-- String-keyed blobs: sync queue, failure log, pending image uploads
CREATE TABLE IF NOT EXISTS blobs (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_delivery ON orders(delivery_date);
"#;

/// Parse a stored timestamp, surfacing corruption as a typed error.
fn parse_datetime(value: &str, column: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            StoreError::CorruptedData(format!("invalid timestamp '{value}' in column '{column}'"))
        })
}

/// Parse a stored date, surfacing corruption as a typed error.
fn parse_date(value: &str, column: &str) -> StoreResult<NaiveDate> {
    value.parse().map_err(|_| {
        StoreError::CorruptedData(format!("invalid date '{value}' in column '{column}'"))
    })
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<(Order, String, String, String)> {
    Ok((
        Order {
            id: row.get(0)?,
            customer: row.get(1)?,
            flavor: row.get(2)?,
            filling: row.get(3)?,
            price: row.get(4)?,
            delivery_date: NaiveDate::MIN, // filled in by the caller
            notes: row.get(6)?,
            image_url: row.get(7)?,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        },
        row.get::<_, String>(5)?,
        row.get::<_, String>(8)?,
        row.get::<_, String>(9)?,
    ))
}

fn finish_order(raw: (Order, String, String, String)) -> StoreResult<Order> {
    let (mut order, delivery, created, updated) = raw;
    order.delivery_date = parse_date(&delivery, "delivery_date")?;
    order.created_at = parse_datetime(&created, "created_at")?;
    order.updated_at = parse_datetime(&updated, "updated_at")?;
    Ok(order)
}

const ORDER_COLUMNS: &str =
    "id, customer, flavor, filling, price, delivery_date, notes, image_url, created_at, updated_at";

/// SQLite implementation of [`LocalStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if necessary) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database. Useful for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocalStore for SqliteStore {
    fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY delivery_date, id"
        ))?;
        let rows = stmt.query_map([], order_from_row)?;
        let mut orders = Vec::new();
        for raw in rows {
            orders.push(finish_order(raw?)?);
        }
        Ok(orders)
    }

    fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))?;
        let raw = stmt.query_row(params![id], order_from_row).optional()?;
        raw.map(finish_order).transpose()
    }

    fn insert_order(&self, order: &Order) -> StoreResult<i64> {
        let conn = self.conn();
        if order.id > 0 {
            conn.execute(
                "INSERT INTO orders (id, customer, flavor, filling, price, delivery_date, notes, image_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    order.id,
                    order.customer,
                    order.flavor,
                    order.filling,
                    order.price,
                    order.delivery_date.to_string(),
                    order.notes,
                    order.image_url,
                    order.created_at.to_rfc3339(),
                    order.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(order.id)
        } else {
            conn.execute(
                "INSERT INTO orders (customer, flavor, filling, price, delivery_date, notes, image_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    order.customer,
                    order.flavor,
                    order.filling,
                    order.price,
                    order.delivery_date.to_string(),
                    order.notes,
                    order.image_url,
                    order.created_at.to_rfc3339(),
                    order.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }

    fn update_order(&self, order: &Order) -> StoreResult<()> {
        let changed = self.conn().execute(
            "UPDATE orders SET customer = ?2, flavor = ?3, filling = ?4, price = ?5,
                    delivery_date = ?6, notes = ?7, image_url = ?8, updated_at = ?9
             WHERE id = ?1",
            params![
                order.id,
                order.customer,
                order.flavor,
                order.filling,
                order.price,
                order.delivery_date.to_string(),
                order.notes,
                order.image_url,
                order.updated_at.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: "orders",
                id: order.id,
            });
        }
        Ok(())
    }

    fn delete_order(&self, id: i64) -> StoreResult<()> {
        self.conn()
            .execute("DELETE FROM orders WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn upsert_order(&self, order: &Order) -> StoreResult<()> {
        self.conn().execute(
            "INSERT INTO orders (id, customer, flavor, filling, price, delivery_date, notes, image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                customer = excluded.customer,
                flavor = excluded.flavor,
                filling = excluded.filling,
                price = excluded.price,
                delivery_date = excluded.delivery_date,
                notes = excluded.notes,
                image_url = excluded.image_url,
                updated_at = excluded.updated_at",
            params![
                order.id,
                order.customer,
                order.flavor,
                order.filling,
                order.price,
                order.delivery_date.to_string(),
                order.notes,
                order.image_url,
                order.created_at.to_rfc3339(),
                order.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn list_flavors(&self) -> StoreResult<Vec<Flavor>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, name, price, updated_at FROM flavors ORDER BY name, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                Flavor {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    updated_at: DateTime::<Utc>::UNIX_EPOCH,
                },
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut flavors = Vec::new();
        for raw in rows {
            let (mut flavor, updated) = raw?;
            flavor.updated_at = parse_datetime(&updated, "updated_at")?;
            flavors.push(flavor);
        }
        Ok(flavors)
    }

    fn insert_flavor(&self, flavor: &Flavor) -> StoreResult<i64> {
        let conn = self.conn();
        if flavor.id > 0 {
            conn.execute(
                "INSERT INTO flavors (id, name, price, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![flavor.id, flavor.name, flavor.price, flavor.updated_at.to_rfc3339()],
            )?;
            Ok(flavor.id)
        } else {
            conn.execute(
                "INSERT INTO flavors (name, price, updated_at) VALUES (?1, ?2, ?3)",
                params![flavor.name, flavor.price, flavor.updated_at.to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }

    fn update_flavor(&self, flavor: &Flavor) -> StoreResult<()> {
        let changed = self.conn().execute(
            "UPDATE flavors SET name = ?2, price = ?3, updated_at = ?4 WHERE id = ?1",
            params![flavor.id, flavor.name, flavor.price, flavor.updated_at.to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: "flavors",
                id: flavor.id,
            });
        }
        Ok(())
    }

    fn delete_flavor(&self, id: i64) -> StoreResult<()> {
        self.conn()
            .execute("DELETE FROM flavors WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn replace_flavors(&self, flavors: &[Flavor]) -> StoreResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM flavors", [])?;
        for flavor in flavors {
            tx.execute(
                "INSERT INTO flavors (id, name, price, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![flavor.id, flavor.name, flavor.price, flavor.updated_at.to_rfc3339()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn list_fillings(&self) -> StoreResult<Vec<Filling>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, name, price, updated_at FROM fillings ORDER BY name, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                Filling {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    updated_at: DateTime::<Utc>::UNIX_EPOCH,
                },
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut fillings = Vec::new();
        for raw in rows {
            let (mut filling, updated) = raw?;
            filling.updated_at = parse_datetime(&updated, "updated_at")?;
            fillings.push(filling);
        }
        Ok(fillings)
    }

    fn insert_filling(&self, filling: &Filling) -> StoreResult<i64> {
        let conn = self.conn();
        if filling.id > 0 {
            conn.execute(
                "INSERT INTO fillings (id, name, price, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    filling.id,
                    filling.name,
                    filling.price,
                    filling.updated_at.to_rfc3339()
                ],
            )?;
            Ok(filling.id)
        } else {
            conn.execute(
                "INSERT INTO fillings (name, price, updated_at) VALUES (?1, ?2, ?3)",
                params![filling.name, filling.price, filling.updated_at.to_rfc3339()],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }

    fn update_filling(&self, filling: &Filling) -> StoreResult<()> {
        let changed = self.conn().execute(
            "UPDATE fillings SET name = ?2, price = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                filling.id,
                filling.name,
                filling.price,
                filling.updated_at.to_rfc3339()
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: "fillings",
                id: filling.id,
            });
        }
        Ok(())
    }

    fn delete_filling(&self, id: i64) -> StoreResult<()> {
        self.conn()
            .execute("DELETE FROM fillings WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn replace_fillings(&self, fillings: &[Filling]) -> StoreResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM fillings", [])?;
        for filling in fillings {
            tx.execute(
                "INSERT INTO fillings (id, name, price, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    filling.id,
                    filling.name,
                    filling.price,
                    filling.updated_at.to_rfc3339()
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_settings(&self) -> StoreResult<Option<ShopSettings>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT shop_name, currency, lead_time_days, updated_at FROM settings WHERE id = 1",
        )?;
        let raw = stmt
            .query_row([], |row| {
                Ok((
                    ShopSettings {
                        shop_name: row.get(0)?,
                        currency: row.get(1)?,
                        lead_time_days: row.get(2)?,
                        updated_at: DateTime::<Utc>::UNIX_EPOCH,
                    },
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()?;
        raw.map(|(mut settings, updated)| {
            settings.updated_at = parse_datetime(&updated, "updated_at")?;
            Ok(settings)
        })
        .transpose()
    }

    fn put_settings(&self, settings: &ShopSettings) -> StoreResult<()> {
        self.conn().execute(
            "INSERT INTO settings (id, shop_name, currency, lead_time_days, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                shop_name = excluded.shop_name,
                currency = excluded.currency,
                lead_time_days = excluded.lead_time_days,
                updated_at = excluded.updated_at",
            params![
                settings.shop_name,
                settings.currency,
                settings.lead_time_days,
                settings.updated_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn get_blob(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT value FROM blobs WHERE key = ?1")?;
        Ok(stmt.query_row(params![key], |row| row.get(0)).optional()?)
    }

    fn put_blob(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn().execute(
            "INSERT INTO blobs (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_blob(&self, key: &str) -> StoreResult<()> {
        self.conn()
            .execute("DELETE FROM blobs WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
