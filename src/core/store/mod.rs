//! SQLite-backed equipage store
//!
//! This module owns the relational store behind the equipage:
//! - Systems and the components attached to them
//! - Notes and crash history per component
//! - The distinguished `Inventory` system, which always exists
//!
//! Uniqueness and ownership are enforced by the schema itself (primary and
//! foreign keys). Constraint violations are translated into typed
//! [`EquipageError`]s, so there is no check-then-insert window. Every
//! operation that writes more than one row runs in a single transaction.
//!
//! IMPORTANT: opening an existing database never recreates tables.
//! Destructive initialization only happens for a brand new file or through
//! [`EquipageStore::reinitialize`].

mod components;
mod import;
mod records;
mod schema;
mod systems;
mod types;

pub use types::*;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use tracing::{debug, info};

use crate::core::error::{EquipageError, Result};
use crate::entities::{Component, WingType};

/// Name of the system holding unequipped components
pub const INVENTORY_SYSTEM: &str = "Inventory";

/// Description given to the Inventory system when it is created
const INVENTORY_DESCRIPTION: &str = "inventory/unequipped";

/// Current schema version, stored in `PRAGMA user_version`
const SCHEMA_VERSION: i32 = 1;

/// Component columns in hydration order (see [`component_from_row`])
const COMPONENT_COLUMNS: &str = "c.id, c.name, c.description, c.serial_number, c.flight_time, \
     c.location, c.history, c.damaged, c.active, c.start_date, c.system";

/// The equipage repository
///
/// Holds one connection for the lifetime of the value. Mutating methods
/// take `&mut self`, so a store has at most one writer at a time.
pub struct EquipageStore {
    conn: Connection,
    location: String,
}

impl EquipageStore {
    /// Open the store at `path`, creating and initializing it if needed
    ///
    /// An existing file is verified, never rebuilt. A file with no tables
    /// and no schema version holds no data and is initialized like a new one.
    pub fn open(path: &Path) -> Result<Self> {
        let location = path.display().to_string();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| EquipageError::unavailable(&location, e))?;
            }
        }

        let existed = path.exists();
        let conn =
            Connection::open(path).map_err(|e| EquipageError::unavailable(&location, e))?;

        // Enable WAL mode for better concurrent readers
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| EquipageError::on_open(&location, e))?;

        let mut store = Self { conn, location };
        store.enable_foreign_keys()?;

        if !existed || store.is_blank()? {
            info!(path = %store.location, "creating new equipage database");
            store.init_schema()?;
        } else {
            debug!(path = %store.location, "opening existing equipage database");
            store.verify_schema()?;
        }
        store.ensure_inventory()?;

        Ok(store)
    }

    /// Open a fresh, empty store in memory
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| EquipageError::unavailable(":memory:", e))?;

        let mut store = Self {
            conn,
            location: ":memory:".to_string(),
        };
        store.enable_foreign_keys()?;
        store.init_schema()?;
        store.ensure_inventory()?;

        Ok(store)
    }

    /// Drop every table and start over with an empty equipage
    ///
    /// All systems, components, notes and crash records are lost.
    pub fn reinitialize(&mut self) -> Result<()> {
        info!(path = %self.location, "reinitializing equipage database");
        self.init_schema()?;
        self.ensure_inventory()
    }

    /// Where this store lives (a file path or `:memory:`)
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Database file path, if the store is file-backed
    pub fn path(&self) -> Option<PathBuf> {
        if self.location == ":memory:" {
            None
        } else {
            Some(PathBuf::from(&self.location))
        }
    }

    /// Counts across the whole equipage
    pub fn statistics(&self) -> Result<StoreStats> {
        let stats = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM Systems),
                (SELECT COUNT(*) FROM Components),
                (SELECT COUNT(*) FROM Components WHERE system = ?1),
                (SELECT COUNT(*) FROM Components WHERE damaged != 0),
                (SELECT COUNT(*) FROM Notes),
                (SELECT COUNT(*) FROM CrashHistory),
                (SELECT COALESCE(SUM(flight_time), 0.0) FROM Components)",
            [INVENTORY_SYSTEM],
            |row| {
                Ok(StoreStats {
                    systems: row.get::<_, i64>(0)? as usize,
                    components: row.get::<_, i64>(1)? as usize,
                    inventory_components: row.get::<_, i64>(2)? as usize,
                    damaged_components: row.get::<_, i64>(3)? as usize,
                    notes: row.get::<_, i64>(4)? as usize,
                    crash_records: row.get::<_, i64>(5)? as usize,
                    total_flight_time: row.get(6)?,
                })
            },
        )?;
        Ok(stats)
    }

    fn enable_foreign_keys(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let enabled: bool = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        if !enabled {
            return Err(EquipageError::unavailable(
                &self.location,
                "SQLite build does not support foreign key enforcement",
            ));
        }
        Ok(())
    }

    /// Ensure the Inventory system row exists
    fn ensure_inventory(&mut self) -> Result<()> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO Systems (name, description, wing_type, start_date)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                INVENTORY_SYSTEM,
                INVENTORY_DESCRIPTION,
                WingType::None.as_str(),
                Utc::now().to_rfc3339()
            ],
        )?;
        if inserted > 0 {
            debug!("created Inventory system");
        }
        Ok(())
    }
}

/// Whether a system row exists (usable inside a transaction)
fn system_exists(conn: &Connection, name: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM Systems WHERE name = ?1)",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Whether a component row exists (usable inside a transaction)
fn component_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM Components WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Hydrate a component from `COMPONENT_COLUMNS` starting at `offset`
fn component_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Component> {
    Ok(Component {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        serial_number: row.get(offset + 3)?,
        flight_time: row.get(offset + 4)?,
        location: row.get(offset + 5)?,
        history: row.get(offset + 6)?,
        damaged: row.get(offset + 7)?,
        active: row.get(offset + 8)?,
        start_date: datetime_column(row, offset + 9)?,
        system: row.get(offset + 10)?,
    })
}

/// Read an RFC 3339 timestamp column
fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a stored wing type column
fn wing_type_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<WingType> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
