//! System operations: add, remove, lookup and the fleet view

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::{
    component_from_row, datetime_column, system_exists, wing_type_column, EquipageStore,
    COMPONENT_COLUMNS, INVENTORY_SYSTEM,
};
use crate::core::error::{
    is_check_violation, is_duplicate_key, is_foreign_key_violation, EquipageError, Result,
};
use crate::entities::{AfslSystem, Component};

impl EquipageStore {
    /// Add a system together with the components it carries
    ///
    /// The system row and every component row are written in one
    /// transaction; a duplicate name or component id leaves the store
    /// untouched.
    pub fn add_system(&mut self, system: &AfslSystem) -> Result<()> {
        for component in &system.components {
            component
                .validate()
                .map_err(|message| EquipageError::InvalidComponent {
                    id: component.id,
                    message,
                })?;
        }

        let tx = self.conn.transaction()?;

        insert_system(&tx, system)?;
        tx.commit()?;
        info!(
            system = %system.name,
            components = system.components.len(),
            "added system"
        );

        Ok(())
    }

    /// Remove a system, returning its components to Inventory first
    ///
    /// Returns how many components were moved to Inventory.
    pub fn remove_system(&mut self, name: &str) -> Result<usize> {
        if name == INVENTORY_SYSTEM {
            return Err(EquipageError::InventoryProtected);
        }

        let tx = self.conn.transaction()?;

        if !system_exists(&tx, name)? {
            return Err(EquipageError::SystemNotFound {
                name: name.to_string(),
            });
        }

        let returned = tx.execute(
            "UPDATE Components SET system = ?1 WHERE system = ?2",
            params![INVENTORY_SYSTEM, name],
        )?;
        tx.execute("DELETE FROM Systems WHERE name = ?1", [name])?;

        tx.commit()?;
        info!(system = %name, returned, "removed system");

        Ok(returned)
    }

    /// Get a system with its components, or `None` if absent
    pub fn get_system(&self, name: &str) -> Result<Option<AfslSystem>> {
        debug!(system = %name, "get_system");

        let system = self
            .conn
            .query_row(
                "SELECT name, description, wing_type, start_date FROM Systems WHERE name = ?1",
                [name],
                |row| {
                    Ok(AfslSystem {
                        name: row.get(0)?,
                        description: row.get(1)?,
                        wing_type: wing_type_column(row, 2)?,
                        start_date: datetime_column(row, 3)?,
                        components: Vec::new(),
                    })
                },
            )
            .optional()?;

        match system {
            Some(mut system) => {
                system.components = self.components_for_system(name)?;
                Ok(Some(system))
            }
            None => Ok(None),
        }
    }

    /// Whether a system with this name exists
    pub fn contains_system(&self, name: &str) -> Result<bool> {
        system_exists(&self.conn, name)
    }

    /// Names of all systems, Inventory first
    pub fn system_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM Systems ORDER BY (name = ?1) DESC, name",
        )?;
        let names = stmt
            .query_map([INVENTORY_SYSTEM], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Every system with its components, read in one query
    ///
    /// Inventory comes first, then systems by name; components by id.
    pub fn fleet(&self) -> Result<Vec<AfslSystem>> {
        let sql = format!(
            "SELECT s.name, s.description, s.wing_type, s.start_date, {}
             FROM Systems s
             LEFT JOIN Components c ON c.system = s.name
             ORDER BY (s.name = ?1) DESC, s.name, c.id",
            COMPONENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([INVENTORY_SYSTEM])?;

        let mut fleet: Vec<AfslSystem> = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;

            let is_new_system = fleet.last().map_or(true, |s| s.name != name);
            if is_new_system {
                fleet.push(AfslSystem {
                    name,
                    description: row.get(1)?,
                    wing_type: wing_type_column(row, 2)?,
                    start_date: datetime_column(row, 3)?,
                    components: Vec::new(),
                });
            }

            // LEFT JOIN yields a NULL component for systems with no parts
            let component_id: Option<i64> = row.get(4)?;
            if component_id.is_some() {
                let component = component_from_row(row, 4)?;
                if let Some(system) = fleet.last_mut() {
                    system.components.push(component);
                }
            }
        }

        debug!(systems = fleet.len(), "loaded fleet");
        Ok(fleet)
    }

    /// Components attached to one system, ordered by id
    pub(super) fn components_for_system(&self, name: &str) -> Result<Vec<Component>> {
        let sql = format!(
            "SELECT {} FROM Components c WHERE c.system = ?1 ORDER BY c.id",
            COMPONENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let components = stmt
            .query_map([name], |row| component_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(components)
    }
}

/// Insert a system row and every component it carries
///
/// Does not commit; callers run this inside their own transaction.
pub(super) fn insert_system(conn: &rusqlite::Connection, system: &AfslSystem) -> Result<()> {
    conn.execute(
        "INSERT INTO Systems (name, description, wing_type, start_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            system.name,
            system.description,
            system.wing_type.as_str(),
            system.start_date.to_rfc3339()
        ],
    )
    .map_err(|e| {
        if is_duplicate_key(&e) {
            EquipageError::DuplicateName {
                name: system.name.clone(),
            }
        } else {
            e.into()
        }
    })?;

    for component in &system.components {
        insert_component(conn, component, &system.name)?;
    }

    Ok(())
}

/// Insert one component row attributed to `system`
///
/// Translates key violations into typed errors: a duplicate id becomes
/// `DuplicateComponent`, an unknown system `SystemNotFound`.
pub(super) fn insert_component(
    conn: &rusqlite::Connection,
    component: &Component,
    system: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO Components (id, name, description, serial_number, flight_time, location,
                                 history, start_date, damaged, active, system)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            component.id,
            component.name,
            component.description,
            component.serial_number,
            component.flight_time,
            component.location,
            component.history,
            component.start_date.to_rfc3339(),
            component.damaged,
            component.active,
            system
        ],
    )
    .map_err(|e| {
        if is_duplicate_key(&e) {
            EquipageError::DuplicateComponent { id: component.id }
        } else if is_foreign_key_violation(&e) {
            EquipageError::SystemNotFound {
                name: system.to_string(),
            }
        } else if is_check_violation(&e) {
            EquipageError::InvalidComponent {
                id: component.id,
                message: "flight time cannot be negative".to_string(),
            }
        } else {
            e.into()
        }
    })?;

    Ok(())
}
