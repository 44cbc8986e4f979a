//! Notes and crash history attached to components

use rusqlite::{params, Connection};
use tracing::info;

use super::{datetime_column, EquipageStore};
use crate::core::error::{is_foreign_key_violation, EquipageError, Result};
use crate::entities::{CrashRecord, Note};

impl EquipageStore {
    /// Attach a note to a component, returning the note id
    pub fn add_note(&mut self, component: i64, summary: &str, description: &str) -> Result<i64> {
        let id = insert_note(&self.conn, component, summary, description)?;
        info!(component, note = id, "added note");
        Ok(id)
    }

    /// Notes for a component, oldest first
    pub fn notes_for_component(&self, component: i64) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, component, summary, description FROM Notes
             WHERE component = ?1 ORDER BY id",
        )?;
        let notes = stmt
            .query_map([component], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    component: row.get(1)?,
                    summary: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notes)
    }

    /// Record a crash for `record.component`, returning the record id
    pub fn add_crash_record(&mut self, record: &CrashRecord) -> Result<i64> {
        let id = insert_crash_record(&self.conn, record)?;
        info!(component = record.component, crash = id, "recorded crash");
        Ok(id)
    }

    /// Crash history for a component, in chronological order
    pub fn crash_history_for_component(&self, component: i64) -> Result<Vec<CrashRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, component, summary, description, time, location FROM CrashHistory
             WHERE component = ?1 ORDER BY time, id",
        )?;
        let records = stmt
            .query_map([component], |row| {
                Ok(CrashRecord {
                    id: row.get(0)?,
                    component: row.get(1)?,
                    summary: row.get(2)?,
                    description: row.get(3)?,
                    time: datetime_column(row, 4)?,
                    location: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

pub(super) fn insert_note(
    conn: &Connection,
    component: i64,
    summary: &str,
    description: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO Notes (summary, description, component) VALUES (?1, ?2, ?3)",
        params![summary, description, component],
    )
    .map_err(|e| missing_component(e, component))?;
    Ok(conn.last_insert_rowid())
}

pub(super) fn insert_crash_record(conn: &Connection, record: &CrashRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO CrashHistory (summary, description, time, location, component)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.summary,
            record.description,
            record.time.to_rfc3339(),
            record.location,
            record.component
        ],
    )
    .map_err(|e| missing_component(e, record.component))?;
    Ok(conn.last_insert_rowid())
}

fn missing_component(err: rusqlite::Error, component: i64) -> EquipageError {
    if is_foreign_key_violation(&err) {
        EquipageError::component_not_found(component)
    } else {
        err.into()
    }
}
