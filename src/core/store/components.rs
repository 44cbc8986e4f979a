//! Component operations: add, lookup, move, update and remove

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::systems::insert_component;
use super::{
    component_exists, component_from_row, system_exists, EquipageStore, COMPONENT_COLUMNS,
    INVENTORY_SYSTEM,
};
use crate::core::error::{EquipageError, Result};
use crate::entities::Component;

impl EquipageStore {
    /// Add a component to `system`
    ///
    /// Fails with `DuplicateComponent` if the id is taken and with
    /// `SystemNotFound` if `system` does not exist.
    pub fn add_component(&mut self, component: &Component, system: &str) -> Result<()> {
        validate(component)?;
        insert_component(&self.conn, component, system)?;
        info!(component = component.id, system = %system, "added component");
        Ok(())
    }

    /// Add a component to the Inventory pool
    pub fn add_to_inventory(&mut self, component: &Component) -> Result<()> {
        self.add_component(component, INVENTORY_SYSTEM)
    }

    /// Get a component by id, or `None` if absent
    pub fn get_component(&self, id: i64) -> Result<Option<Component>> {
        debug!(component = id, "get_component");
        let sql = format!("SELECT {} FROM Components c WHERE c.id = ?1", COMPONENT_COLUMNS);
        let component = self
            .conn
            .query_row(&sql, [id], |row| component_from_row(row, 0))
            .optional()?;
        Ok(component)
    }

    /// Whether a component with this id exists
    pub fn contains_component(&self, id: i64) -> Result<bool> {
        component_exists(&self.conn, id)
    }

    /// Next unused component id
    ///
    /// Only a suggestion: the primary key still rejects a concurrent taker.
    pub fn allocate_component_id(&self) -> Result<i64> {
        let max: Option<i64> =
            self.conn
                .query_row("SELECT MAX(id) FROM Components", [], |row| row.get(0))?;
        match max {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(EquipageError::InvalidComponent {
                id: max,
                message: "no id left above the largest component id; pass one explicitly"
                    .to_string(),
            }),
        }
    }

    /// Move a component from one system to another
    ///
    /// A no-op when `from == to`. Otherwise both systems must exist and the
    /// component must currently be attached to `from`.
    pub fn move_component(&mut self, id: i64, from: &str, to: &str) -> Result<()> {
        if from == to {
            debug!(component = id, system = %from, "move is a no-op");
            return Ok(());
        }

        let tx = self.conn.transaction()?;

        for name in [from, to] {
            if !system_exists(&tx, name)? {
                return Err(EquipageError::SystemNotFound {
                    name: name.to_string(),
                });
            }
        }

        let moved = tx.execute(
            "UPDATE Components SET system = ?1 WHERE id = ?2 AND system = ?3",
            params![to, id, from],
        )?;
        if moved == 0 {
            return Err(EquipageError::component_not_on(id, from));
        }

        tx.commit()?;
        info!(component = id, from = %from, to = %to, "moved component");

        Ok(())
    }

    /// Rewrite the descriptive fields of an existing component
    ///
    /// The owning system is left alone; use [`EquipageStore::move_component`].
    pub fn update_component(&mut self, component: &Component) -> Result<()> {
        validate(component)?;

        let updated = self.conn.execute(
            "UPDATE Components
             SET name = ?1, description = ?2, serial_number = ?3, flight_time = ?4,
                 location = ?5, history = ?6, damaged = ?7, active = ?8
             WHERE id = ?9",
            params![
                component.name,
                component.description,
                component.serial_number,
                component.flight_time,
                component.location,
                component.history,
                component.damaged,
                component.active,
                component.id
            ],
        )?;
        if updated == 0 {
            return Err(EquipageError::component_not_found(component.id));
        }

        info!(component = component.id, "updated component");
        Ok(())
    }

    /// Add minutes to a component's cumulative flight time
    ///
    /// Returns the new total.
    pub fn log_flight_time(&mut self, id: i64, minutes: f64) -> Result<f64> {
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(EquipageError::InvalidComponent {
                id,
                message: format!("cannot log {} minutes of flight time", minutes),
            });
        }

        let tx = self.conn.transaction()?;
        let current: f64 = tx
            .query_row(
                "SELECT flight_time FROM Components WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| EquipageError::component_not_found(id))?;

        let total = current + minutes;
        if !total.is_finite() {
            return Err(EquipageError::InvalidComponent {
                id,
                message: format!(
                    "logging {} minutes on top of {} overflows the flight time",
                    minutes, current
                ),
            });
        }

        tx.execute(
            "UPDATE Components SET flight_time = ?1 WHERE id = ?2",
            params![total, id],
        )?;
        tx.commit()?;

        info!(component = id, minutes, total, "logged flight time");
        Ok(total)
    }

    /// Delete a component along with its notes and crash history
    ///
    /// Returns the removed component.
    pub fn remove_component(&mut self, id: i64) -> Result<Component> {
        let component = self
            .get_component(id)?
            .ok_or_else(|| EquipageError::component_not_found(id))?;

        let tx = self.conn.transaction()?;
        let notes = tx.execute("DELETE FROM Notes WHERE component = ?1", [id])?;
        let crashes = tx.execute("DELETE FROM CrashHistory WHERE component = ?1", [id])?;
        let removed = tx.execute("DELETE FROM Components WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(EquipageError::component_not_found(id));
        }
        tx.commit()?;

        info!(component = id, notes, crashes, "removed component");
        Ok(component)
    }
}

fn validate(component: &Component) -> Result<()> {
    component
        .validate()
        .map_err(|message| EquipageError::InvalidComponent {
            id: component.id,
            message,
        })
}
