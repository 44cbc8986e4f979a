//! Database schema initialization and verification

use tracing::warn;

use super::{EquipageStore, SCHEMA_VERSION};
use crate::core::error::{EquipageError, Result};

/// Tables every equipage database must contain
const REQUIRED_TABLES: [&str; 4] = ["Systems", "Components", "Notes", "CrashHistory"];

impl EquipageStore {
    /// Drop and recreate all tables
    ///
    /// Destructive: only called for a new database or an explicit reset.
    pub(super) fn init_schema(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            r#"
            DROP TABLE IF EXISTS CrashHistory;
            DROP TABLE IF EXISTS Notes;
            DROP TABLE IF EXISTS Components;
            DROP TABLE IF EXISTS Systems;

            -- Airframes (plus the Inventory pool)
            CREATE TABLE Systems (
                name TEXT PRIMARY KEY NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                wing_type TEXT NOT NULL DEFAULT 'Unspecified',
                start_date TEXT NOT NULL
            );

            -- Parts; every part belongs to exactly one system
            CREATE TABLE Components (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                serial_number TEXT NOT NULL DEFAULT '',
                flight_time REAL NOT NULL DEFAULT 0 CHECK (flight_time >= 0),
                location TEXT NOT NULL DEFAULT '',
                history TEXT NOT NULL DEFAULT '',
                start_date TEXT NOT NULL,
                damaged NUMERIC NOT NULL DEFAULT 0,
                active NUMERIC NOT NULL DEFAULT 1,
                system TEXT NOT NULL REFERENCES Systems(name)
            );
            CREATE INDEX idx_components_system ON Components(system);

            -- General notes per component
            CREATE TABLE Notes (
                id INTEGER PRIMARY KEY,
                summary TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                component INTEGER NOT NULL REFERENCES Components(id)
            );
            CREATE INDEX idx_notes_component ON Notes(component);

            -- Crash history per component
            CREATE TABLE CrashHistory (
                id INTEGER PRIMARY KEY,
                summary TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                time TEXT NOT NULL,
                location TEXT NOT NULL DEFAULT '',
                component INTEGER NOT NULL REFERENCES Components(id)
            );
            CREATE INDEX idx_crash_history_component ON CrashHistory(component);
            "#,
        )?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
        tx.commit()?;

        Ok(())
    }

    /// Check an existing database has the expected shape
    /// Whether the database holds nothing at all (no tables, version 0)
    ///
    /// A zero-byte file left by `touch` or an interrupted first open looks
    /// like this.
    pub(super) fn is_blank(&self) -> Result<bool> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )?;
        Ok(version == 0 && tables == 0)
    }

    pub(super) fn verify_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        let mut missing = Vec::new();
        for table in REQUIRED_TABLES {
            let present: bool = self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                [table],
                |row| row.get(0),
            )?;
            if !present {
                missing.push(table);
            }
        }

        if !missing.is_empty() {
            warn!(path = %self.location, ?missing, "equipage database is missing tables");
            return Err(EquipageError::SchemaIntegrity {
                message: format!(
                    "{} is missing table(s) {}; run `lari init --force` to recreate it (destroys data)",
                    self.location,
                    missing.join(", ")
                ),
            });
        }

        if version != SCHEMA_VERSION {
            return Err(EquipageError::SchemaIntegrity {
                message: format!(
                    "{} has schema version {}, expected {}",
                    self.location, version, SCHEMA_VERSION
                ),
            });
        }

        Ok(())
    }
}
