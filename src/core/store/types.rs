//! Store summary types

use serde::Serialize;

use crate::entities::{AfslSystem, Component, CrashRecord};

/// Equipage statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    /// Systems including Inventory
    pub systems: usize,
    pub components: usize,
    /// Components currently sitting in Inventory
    pub inventory_components: usize,
    pub damaged_components: usize,
    pub notes: usize,
    pub crash_records: usize,
    /// Sum of all component flight time, in minutes
    pub total_flight_time: f64,
}

impl StoreStats {
    /// Operational systems (everything except Inventory)
    pub fn vehicles(&self) -> usize {
        self.systems.saturating_sub(1)
    }

    /// Components attached to operational systems
    pub fn equipped_components(&self) -> usize {
        self.components.saturating_sub(self.inventory_components)
    }
}

/// A note waiting to be written as part of an [`ImportBatch`]
#[derive(Debug, Clone, PartialEq)]
pub struct PendingNote {
    pub component: i64,
    pub summary: String,
    pub description: String,
}

/// Rows written together by [`super::EquipageStore::import_batch`]
///
/// Systems carry their own components. Loose `components` are attached to
/// the system named in their `system` field, which must already exist or
/// be one of `systems`.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub systems: Vec<AfslSystem>,
    pub components: Vec<Component>,
    pub notes: Vec<PendingNote>,
    pub crash_records: Vec<CrashRecord>,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
            && self.components.is_empty()
            && self.notes.is_empty()
            && self.crash_records.is_empty()
    }
}

/// Row counts written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub systems: usize,
    pub components: usize,
    pub notes: usize,
    pub crash_records: usize,
}
