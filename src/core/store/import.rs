//! Bulk loading in a single transaction

use tracing::{info, warn};

use super::records::{insert_crash_record, insert_note};
use super::systems::{insert_component, insert_system};
use super::{EquipageStore, ImportBatch, ImportCounts};
use crate::core::error::{EquipageError, Result};

impl EquipageStore {
    /// Write a whole batch of systems, components, notes and crash records
    ///
    /// Either every row lands or none do. Duplicate names and ids fail the
    /// batch with the same errors as the single-row operations.
    pub fn import_batch(&mut self, batch: &ImportBatch) -> Result<ImportCounts> {
        let carried = batch.systems.iter().flat_map(|s| s.components.iter());
        for component in carried.chain(batch.components.iter()) {
            component
                .validate()
                .map_err(|message| EquipageError::InvalidComponent {
                    id: component.id,
                    message,
                })?;
        }

        let tx = self.conn.transaction()?;
        let mut counts = ImportCounts::default();

        let written = (|| -> Result<()> {
            for system in &batch.systems {
                insert_system(&tx, system)?;
                counts.systems += 1;
                counts.components += system.components.len();
            }
            for component in &batch.components {
                insert_component(&tx, component, &component.system)?;
                counts.components += 1;
            }
            for note in &batch.notes {
                insert_note(&tx, note.component, &note.summary, &note.description)?;
                counts.notes += 1;
            }
            for record in &batch.crash_records {
                insert_crash_record(&tx, record)?;
                counts.crash_records += 1;
            }
            Ok(())
        })();

        if let Err(e) = written {
            warn!(error = %e, "import rejected, nothing written");
            return Err(e);
        }

        tx.commit()?;
        info!(
            systems = counts.systems,
            components = counts.components,
            notes = counts.notes,
            crash_records = counts.crash_records,
            "imported batch"
        );

        Ok(counts)
    }
}
