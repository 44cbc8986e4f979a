//! Legacy XML equipage files
//!
//! Older LARI tooling kept the whole fleet in one XML document:
//!
//! ```xml
//! <equipage>
//!   <afslsystem Name="CONDOR" Description="survey airframe" WingType="FixedWing">
//!     <component>
//!       <description>Pixhawk</description>
//!       <id>101</id>
//!       <flighttime>30</flighttime>
//!       <location>hangar</location>
//!       <history></history>
//!       <crashnotes></crashnotes>
//!       <generalnotes></generalnotes>
//!       <active>True</active>
//!     </component>
//!   </afslsystem>
//! </equipage>
//! ```
//!
//! This module reads that shape into an [`ImportBatch`] and writes the
//! current fleet back out. The SQLite store stays the only source of truth;
//! XML exists purely at the boundary.

use std::fs;
use std::path::Path;

use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::{EquipageError, Result};
use crate::core::store::{
    EquipageStore, ImportBatch, ImportCounts, PendingNote, INVENTORY_SYSTEM,
};
use crate::entities::{AfslSystem, Component, CrashRecord, WingType};

/// Summary given to notes that came from a `generalnotes` element
pub const LEGACY_NOTE_SUMMARY: &str = "Legacy notes";

/// Summary given to crash records that came from a `crashnotes` element
pub const LEGACY_CRASH_SUMMARY: &str = "Legacy crash notes";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Root `equipage` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "equipage")]
pub struct LegacyEquipage {
    #[serde(rename = "afslsystem", default)]
    pub systems: Vec<LegacySystem>,
}

/// One `afslsystem` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacySystem {
    #[serde(rename = "@Name")]
    pub name: String,

    #[serde(rename = "@Description", default)]
    pub description: String,

    #[serde(rename = "@WingType", default)]
    pub wing_type: String,

    #[serde(rename = "component", default)]
    pub components: Vec<LegacyComponent>,
}

/// One `component` element; child order matches what older tools expect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyComponent {
    #[serde(default)]
    pub description: String,

    pub id: i64,

    #[serde(rename = "flighttime", default)]
    pub flight_time: f64,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub history: String,

    #[serde(rename = "crashnotes", default)]
    pub crash_notes: String,

    #[serde(rename = "generalnotes", default)]
    pub general_notes: String,

    /// `True`/`False` in any case, or `1`/`0`
    #[serde(default = "default_active")]
    pub active: String,
}

fn default_active() -> String {
    "True".to_string()
}

fn legacy_error(message: impl ToString) -> EquipageError {
    EquipageError::Legacy {
        message: message.to_string(),
    }
}

/// Parse the `active` element text
fn parse_active(raw: &str, id: i64) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(legacy_error(format!(
            "component {}: active must be True, False, 1 or 0, found '{}'",
            id, other
        ))),
    }
}

fn format_active(active: bool) -> String {
    let text = if active { "True" } else { "False" };
    text.to_string()
}

/// Parse a legacy equipage document
pub fn parse_equipage(xml: &str) -> Result<LegacyEquipage> {
    let doc: LegacyEquipage = quick_xml::de::from_str(xml).map_err(legacy_error)?;
    debug!(systems = doc.systems.len(), "parsed legacy equipage");
    Ok(doc)
}

/// Read and parse a legacy equipage file
pub fn read_equipage_file(path: &Path) -> Result<LegacyEquipage> {
    let xml = fs::read_to_string(path)
        .map_err(|e| legacy_error(format!("cannot read {}: {}", path.display(), e)))?;
    parse_equipage(&xml)
}

impl LegacyComponent {
    fn to_component(&self, system: &str) -> Result<Component> {
        let mut component = Component::new(self.id, self.description.trim())
            .with_flight_time(self.flight_time)
            .with_location(self.location.trim());
        component.history = self.history.trim().to_string();
        component.active = parse_active(&self.active, self.id)?;
        component.system = system.to_string();
        Ok(component)
    }
}

impl LegacyEquipage {
    /// Convert the document into rows for [`EquipageStore::import_batch`]
    ///
    /// An `afslsystem` named Inventory adds its components to the existing
    /// Inventory instead of creating a system. Unknown wing types become
    /// `Unspecified`.
    pub fn to_batch(&self) -> Result<ImportBatch> {
        let mut batch = ImportBatch::default();

        for legacy in &self.systems {
            let name = legacy.name.trim();
            if name.is_empty() {
                return Err(legacy_error("afslsystem without a Name attribute"));
            }

            let mut components = Vec::with_capacity(legacy.components.len());
            for element in &legacy.components {
                components.push(element.to_component(name)?);

                let notes = element.general_notes.trim();
                if !notes.is_empty() {
                    batch.notes.push(PendingNote {
                        component: element.id,
                        summary: LEGACY_NOTE_SUMMARY.to_string(),
                        description: notes.to_string(),
                    });
                }
                let crash = element.crash_notes.trim();
                if !crash.is_empty() {
                    batch.crash_records.push(
                        CrashRecord::new(element.id, LEGACY_CRASH_SUMMARY).with_description(crash),
                    );
                }
            }

            if name == INVENTORY_SYSTEM {
                batch.components.extend(components);
            } else {
                let mut system = AfslSystem::new(
                    name,
                    legacy.description.trim(),
                    WingType::from_legacy(&legacy.wing_type),
                );
                system.components = components;
                batch.systems.push(system);
            }
        }

        Ok(batch)
    }

    /// Serialize to indented XML with a declaration
    pub fn to_xml(&self) -> Result<String> {
        let mut body = String::new();
        let mut serializer = Serializer::new(&mut body);
        serializer.indent(' ', 2);
        self.serialize(serializer).map_err(legacy_error)?;
        Ok(format!("{}{}\n", XML_DECLARATION, body))
    }
}

/// Import a legacy document into the store in one transaction
pub fn import_into(store: &mut EquipageStore, doc: &LegacyEquipage) -> Result<ImportCounts> {
    let batch = doc.to_batch()?;
    let counts = store.import_batch(&batch)?;
    info!(
        systems = counts.systems,
        components = counts.components,
        "imported legacy equipage"
    );
    Ok(counts)
}

/// Flatten record text back into one legacy text field
fn flatten<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>, legacy_summary: &str) -> String {
    entries
        .map(|(summary, description)| {
            match (summary == legacy_summary, description.is_empty()) {
                (true, _) => description.to_string(),
                (false, true) => summary.to_string(),
                (false, false) => format!("{}: {}", summary, description),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build a legacy document from the current fleet
///
/// Notes and crash history are folded into `generalnotes` and `crashnotes`.
pub fn export_fleet(store: &EquipageStore) -> Result<LegacyEquipage> {
    let mut doc = LegacyEquipage::default();

    for system in store.fleet()? {
        let mut legacy = LegacySystem {
            name: system.name.clone(),
            description: system.description.clone(),
            wing_type: system.wing_type.as_str().to_string(),
            components: Vec::with_capacity(system.components.len()),
        };

        for component in &system.components {
            let notes = store.notes_for_component(component.id)?;
            let crashes = store.crash_history_for_component(component.id)?;

            legacy.components.push(LegacyComponent {
                description: component.description.clone(),
                id: component.id,
                flight_time: component.flight_time,
                location: component.location.clone(),
                history: component.history.clone(),
                crash_notes: flatten(
                    crashes
                        .iter()
                        .map(|c| (c.summary.as_str(), c.description.as_str())),
                    LEGACY_CRASH_SUMMARY,
                ),
                general_notes: flatten(
                    notes
                        .iter()
                        .map(|n| (n.summary.as_str(), n.description.as_str())),
                    LEGACY_NOTE_SUMMARY,
                ),
                active: format_active(component.active),
            });
        }

        doc.systems.push(legacy);
    }

    Ok(doc)
}

/// Write the current fleet to a legacy equipage file
pub fn write_equipage_file(path: &Path, store: &EquipageStore) -> Result<usize> {
    let doc = export_fleet(store)?;
    let xml = doc.to_xml()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| legacy_error(format!("cannot create {}: {}", parent.display(), e)))?;
        }
    }
    fs::write(path, xml)
        .map_err(|e| legacy_error(format!("cannot write {}: {}", path.display(), e)))?;

    info!(path = %path.display(), systems = doc.systems.len(), "exported legacy equipage");
    Ok(doc.systems.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<equipage>
  <afslsystem Name="Inventory" Description="inventory/unequipped" WingType="None">
    <component>
      <description>Spare battery</description>
      <id>5</id>
      <flighttime>0</flighttime>
      <location>cabinet B</location>
      <history></history>
      <crashnotes></crashnotes>
      <generalnotes>swollen cell, do not fly</generalnotes>
      <active>FALSE</active>
    </component>
  </afslsystem>
  <afslsystem Name="CONDOR" Description="survey airframe" WingType="FixedWing">
    <component>
      <description>Pixhawk</description>
      <id>101</id>
      <flighttime>42.5</flighttime>
      <location>hangar</location>
      <history>HAWK until 2017</history>
      <crashnotes>nose-in at field 2</crashnotes>
      <generalnotes></generalnotes>
      <active>True</active>
    </component>
  </afslsystem>
  <afslsystem Name="BLIMP" Description="" WingType="Zeppelin"/>
</equipage>
"#;

    #[test]
    fn test_parse_sample() {
        let doc = parse_equipage(SAMPLE).unwrap();

        assert_eq!(doc.systems.len(), 3);
        assert_eq!(doc.systems[1].name, "CONDOR");
        assert_eq!(doc.systems[1].wing_type, "FixedWing");
        let pixhawk = &doc.systems[1].components[0];
        assert_eq!(pixhawk.id, 101);
        assert_eq!(pixhawk.flight_time, 42.5);
        assert_eq!(pixhawk.crash_notes, "nose-in at field 2");
        assert!(doc.systems[2].components.is_empty());
    }

    #[test]
    fn test_batch_merges_inventory_and_maps_notes() {
        let batch = parse_equipage(SAMPLE).unwrap().to_batch().unwrap();

        let names: Vec<&str> = batch.systems.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CONDOR", "BLIMP"]);
        assert_eq!(batch.systems[1].wing_type, WingType::Unspecified);

        assert_eq!(batch.components.len(), 1);
        assert_eq!(batch.components[0].system, INVENTORY_SYSTEM);
        assert!(!batch.components[0].active);

        assert_eq!(batch.notes.len(), 1);
        assert_eq!(batch.notes[0].component, 5);
        assert_eq!(batch.crash_records.len(), 1);
        assert_eq!(batch.crash_records[0].summary, LEGACY_CRASH_SUMMARY);
        assert_eq!(batch.crash_records[0].description, "nose-in at field 2");
    }

    #[test]
    fn test_bad_active_value() {
        let xml = r#"<equipage><afslsystem Name="X"><component>
            <description>d</description><id>1</id><active>maybe</active>
        </component></afslsystem></equipage>"#;
        let err = parse_equipage(xml).unwrap().to_batch().unwrap_err();
        assert!(matches!(err, EquipageError::Legacy { .. }));
    }

    #[test]
    fn test_numeric_active_values() {
        let xml = r#"<equipage><afslsystem Name="X">
            <component><description>a</description><id>1</id><active>0</active></component>
            <component><description>b</description><id>2</id><active>1</active></component>
        </afslsystem></equipage>"#;
        let batch = parse_equipage(xml).unwrap().to_batch().unwrap();
        let components = &batch.systems[0].components;
        assert!(!components[0].active);
        assert!(components[1].active);
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_equipage("<equipage><afslsystem").unwrap_err();
        assert!(matches!(err, EquipageError::Legacy { .. }));
    }

    #[test]
    fn test_import_then_export_round_trip() {
        let mut store = EquipageStore::open_in_memory().unwrap();
        let counts = import_into(&mut store, &parse_equipage(SAMPLE).unwrap()).unwrap();

        assert_eq!(counts.systems, 2);
        assert_eq!(counts.components, 2);
        assert_eq!(counts.notes, 1);
        assert_eq!(counts.crash_records, 1);

        let exported = export_fleet(&store).unwrap();
        let xml = exported.to_xml().unwrap();
        let reparsed = parse_equipage(&xml).unwrap();
        assert_eq!(reparsed, exported);

        let inventory = &reparsed.systems[0];
        assert_eq!(inventory.name, INVENTORY_SYSTEM);
        assert_eq!(inventory.components[0].general_notes, "swollen cell, do not fly");
        assert_eq!(inventory.components[0].active, "False");

        let condor = reparsed.systems.iter().find(|s| s.name == "CONDOR").unwrap();
        assert_eq!(condor.components[0].crash_notes, "nose-in at field 2");
        assert_eq!(condor.components[0].history, "HAWK until 2017");
    }

    #[test]
    fn test_import_duplicate_system_writes_nothing() {
        let mut store = EquipageStore::open_in_memory().unwrap();
        store
            .add_system(&AfslSystem::new("CONDOR", "", WingType::FixedWing))
            .unwrap();

        let err = import_into(&mut store, &parse_equipage(SAMPLE).unwrap()).unwrap_err();

        assert!(matches!(err, EquipageError::DuplicateName { .. }));
        assert!(!store.contains_component(5).unwrap());
        assert!(!store.contains_system("BLIMP").unwrap());
    }

    #[test]
    fn test_flatten_notes() {
        let entries = [("Legacy notes", "old text"), ("Inspection", "crack"), ("Bare", "")];
        assert_eq!(
            flatten(entries.into_iter(), LEGACY_NOTE_SUMMARY),
            "old text\nInspection: crack\nBare"
        );
    }
}
