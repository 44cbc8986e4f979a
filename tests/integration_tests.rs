//! Integration tests for the lari CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd. Every
//! test gets its own database inside a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temp directory plus the database path inside it
struct Equipage {
    tmp: TempDir,
    db: PathBuf,
}

impl Equipage {
    /// Fresh, initialized equipage
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join("equipage.db");
        let eq = Equipage { tmp, db };
        eq.lari().arg("init").assert().success();
        eq
    }

    /// lari command pointed at this equipage, run from the temp directory
    fn lari(&self) -> Command {
        let mut cmd = Command::cargo_bin("lari").unwrap();
        cmd.current_dir(self.tmp.path())
            .env_remove("LARI_DATABASE")
            .env_remove("LARI_LEGACY_FILE")
            .env_remove("LARI_LOG")
            .arg("--database")
            .arg(&self.db);
        cmd
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.lari().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "lari {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn add_system(&self, name: &str, wing: &str) {
        self.lari()
            .args(["system", "add", name, "--wing-type", wing])
            .assert()
            .success();
    }

    fn add_component(&self, id: i64, description: &str, system: &str) {
        self.lari()
            .args(["component", "add", description, "--id"])
            .arg(id.to_string())
            .args(["--system", system])
            .assert()
            .success();
    }
}

const LEGACY_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<equipage>
  <afslsystem Name="Inventory" Description="inventory/unequipped" WingType="None">
    <component>
      <description>Spare battery</description>
      <id>5</id>
      <flighttime>0</flighttime>
      <location>cabinet B</location>
      <history></history>
      <crashnotes></crashnotes>
      <generalnotes>swollen cell</generalnotes>
      <active>True</active>
    </component>
  </afslsystem>
  <afslsystem Name="CONDOR" Description="survey airframe" WingType="FixedWing">
    <component>
      <description>Pixhawk</description>
      <id>101</id>
      <flighttime>42.5</flighttime>
      <location>hangar</location>
      <history></history>
      <crashnotes>nose-in at field 2</crashnotes>
      <generalnotes></generalnotes>
      <active>True</active>
    </component>
  </afslsystem>
</equipage>
"#;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    Command::cargo_bin("lari")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("equipage"))
        .stdout(predicate::str::contains("component"));
}

#[test]
fn test_version_displays() {
    Command::cargo_bin("lari")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lari"));
}

#[test]
fn test_unknown_command_fails() {
    Command::cargo_bin("lari")
        .unwrap()
        .arg("teleport")
        .assert()
        .failure();
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("lari")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lari"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_database() {
    let eq = Equipage::new();
    assert!(eq.db.exists());
    eq.lari()
        .args(["system", "list", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inventory"));
}

#[test]
fn test_init_twice_keeps_data() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "fixed-wing");

    eq.lari()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    assert!(eq.stdout(&["system", "list", "-f", "id"]).contains("CONDOR"));
}

#[test]
fn test_init_force_resets() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "fixed-wing");

    eq.lari().args(["init", "--force", "-y"]).assert().success();

    let systems = eq.stdout(&["system", "list", "-f", "id"]);
    assert!(systems.contains("Inventory"));
    assert!(!systems.contains("CONDOR"));
}

#[test]
fn test_init_force_replaces_foreign_file() {
    let eq = Equipage::new();
    fs::write(&eq.db, "definitely not sqlite").unwrap();

    eq.lari().arg("status").assert().failure();
    eq.lari().args(["init", "--force", "-y"]).assert().success();
    eq.lari().arg("status").assert().success();
}

// ============================================================================
// System Tests
// ============================================================================

#[test]
fn test_system_add_and_show() {
    let eq = Equipage::new();
    eq.lari()
        .args(["system", "add", "CONDOR", "-d", "survey airframe", "-w", "fixed-wing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added system CONDOR"));

    let json = eq.stdout(&["system", "show", "CONDOR", "-f", "json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], "CONDOR");
    assert_eq!(value["description"], "survey airframe");
    assert_eq!(value["components"].as_array().unwrap().len(), 0);
}

#[test]
fn test_system_add_duplicate_fails() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");

    eq.lari()
        .args(["system", "add", "CONDOR"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_system_add_inventory_name_fails() {
    let eq = Equipage::new();
    eq.lari()
        .args(["system", "add", "Inventory"])
        .assert()
        .failure();
}

#[test]
fn test_system_add_bad_wing_type_fails() {
    let eq = Equipage::new();
    eq.lari()
        .args(["system", "add", "ZEP", "-w", "zeppelin"])
        .assert()
        .failure();
}

#[test]
fn test_system_list_puts_inventory_first() {
    let eq = Equipage::new();
    eq.add_system("ALBATROSS", "fixed-wing");
    eq.add_system("BUZZARD", "octo");

    let ids = eq.stdout(&["system", "list", "-f", "id"]);
    let names: Vec<&str> = ids.lines().collect();
    assert_eq!(names, vec!["Inventory", "ALBATROSS", "BUZZARD"]);
}

#[test]
fn test_system_show_missing_fails() {
    let eq = Equipage::new();
    eq.lari()
        .args(["system", "show", "GHOST"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_system_remove_returns_components() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");
    eq.add_component(101, "Pixhawk", "CONDOR");
    eq.add_component(102, "GPS", "CONDOR");

    eq.lari()
        .args(["system", "remove", "CONDOR", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 component(s) returned"));

    let inventory = eq.stdout(&["system", "show", "Inventory", "-f", "id"]);
    assert!(inventory.contains("101"));
    assert!(inventory.contains("102"));
    assert!(!eq.stdout(&["system", "list", "-f", "id"]).contains("CONDOR"));
}

#[test]
fn test_system_remove_inventory_fails() {
    let eq = Equipage::new();
    eq.lari()
        .args(["system", "remove", "Inventory", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be removed"));
}

// ============================================================================
// Component Tests
// ============================================================================

#[test]
fn test_component_add_defaults_to_inventory() {
    let eq = Equipage::new();
    let id = eq.stdout(&["component", "add", "Spare prop", "-q"]);
    let id = id.trim();
    assert!(!id.is_empty());

    let json = eq.stdout(&["component", "show", id, "-f", "json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["system"], "Inventory");
    assert_eq!(value["description"], "Spare prop");
}

#[test]
fn test_component_add_duplicate_id_fails() {
    let eq = Equipage::new();
    eq.add_component(7, "ESC", "Inventory");
    eq.lari()
        .args(["component", "add", "Other ESC", "--id", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_component_add_to_unknown_system_fails() {
    let eq = Equipage::new();
    eq.lari()
        .args(["component", "add", "Motor", "--system", "GHOST"])
        .assert()
        .failure();
}

#[test]
fn test_component_move_between_systems() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");
    eq.add_component(101, "Pixhawk 2.1", "Inventory");

    eq.lari()
        .args(["component", "move", "101", "--to", "CONDOR"])
        .assert()
        .success();

    let condor = eq.stdout(&["system", "show", "CONDOR", "-f", "id"]);
    assert_eq!(condor.trim(), "101");
    let inventory = eq.stdout(&["system", "show", "Inventory", "-f", "id"]);
    assert!(!inventory.contains("101"));
}

#[test]
fn test_component_move_wrong_source_fails() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");
    eq.add_system("HAWK", "quad");
    eq.add_component(101, "Pixhawk", "CONDOR");

    eq.lari()
        .args(["component", "move", "101", "--from", "HAWK", "--to", "Inventory"])
        .assert()
        .failure();

    let condor = eq.stdout(&["system", "show", "CONDOR", "-f", "id"]);
    assert_eq!(condor.trim(), "101");
}

#[test]
fn test_component_log_and_records() {
    let eq = Equipage::new();
    eq.add_component(101, "Pixhawk", "Inventory");

    eq.lari()
        .args(["component", "log", "101", "30"])
        .assert()
        .success();
    eq.lari()
        .args(["component", "note", "101", "Firmware updated", "-d", "4.3.7"])
        .assert()
        .success();
    eq.lari()
        .args(["component", "crash", "101", "Hard landing", "-l", "field 2"])
        .assert()
        .success();

    let json = eq.stdout(&["component", "show", "101", "-f", "json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["flight_time"], 30.0);
    assert_eq!(value["notes"][0]["summary"], "Firmware updated");
    assert_eq!(value["crash_history"][0]["location"], "field 2");
}

#[test]
fn test_component_list_damaged_filter() {
    let eq = Equipage::new();
    eq.add_component(1, "Good motor", "Inventory");
    eq.add_component(2, "Bent prop", "Inventory");
    eq.lari()
        .args(["component", "update", "2", "--damaged", "true"])
        .assert()
        .success();

    let ids = eq.stdout(&["component", "list", "--damaged", "-f", "id"]);
    assert_eq!(ids.trim(), "2");
}

#[test]
fn test_component_list_csv() {
    let eq = Equipage::new();
    eq.add_component(1, "Motor", "Inventory");

    eq.lari()
        .args(["component", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id,description,system"))
        .stdout(predicate::str::contains("1,Motor,Inventory"));
}

#[test]
fn test_component_remove() {
    let eq = Equipage::new();
    eq.add_component(9, "Cracked frame", "Inventory");

    eq.lari()
        .args(["component", "remove", "9", "-y"])
        .assert()
        .success();
    eq.lari()
        .args(["component", "show", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Fleet / Status Tests
// ============================================================================

#[test]
fn test_fleet_tree() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");
    eq.add_component(101, "Pixhawk", "CONDOR");

    eq.lari()
        .args(["fleet", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inventory"))
        .stdout(predicate::str::contains("CONDOR"))
        .stdout(predicate::str::contains("Pixhawk"));
}

#[test]
fn test_fleet_json_hide_empty() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");
    eq.add_system("EMPTY", "none");
    eq.add_component(101, "Pixhawk", "CONDOR");

    let json = eq.stdout(&["fleet", "--hide-empty", "-f", "json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["CONDOR"]);
}

#[test]
fn test_status_json() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");
    eq.add_component(101, "Pixhawk", "CONDOR");
    eq.add_component(5, "Spare battery", "Inventory");

    let json = eq.stdout(&["status", "-f", "json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["vehicles"], 1);
    assert_eq!(value["components"], 2);
    assert_eq!(value["equipped_components"], 1);
    assert_eq!(value["inventory_components"], 1);
}

#[test]
fn test_status_dashboard() {
    let eq = Equipage::new();
    eq.lari()
        .args(["status", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FLEET"))
        .stdout(predicate::str::contains("SYSTEMS"));
}

// ============================================================================
// Import / Export Tests
// ============================================================================

#[test]
fn test_import_legacy_file() {
    let eq = Equipage::new();
    let xml = eq.tmp.path().join("equipage.xml");
    fs::write(&xml, LEGACY_XML).unwrap();

    eq.lari()
        .args(["import", "legacy"])
        .arg(&xml)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported"));

    let condor = eq.stdout(&["system", "show", "CONDOR", "-f", "json"]);
    let value: serde_json::Value = serde_json::from_str(&condor).unwrap();
    assert_eq!(value["components"][0]["id"], 101);

    let pixhawk = eq.stdout(&["component", "show", "101", "-f", "json"]);
    let value: serde_json::Value = serde_json::from_str(&pixhawk).unwrap();
    assert_eq!(value["crash_history"][0]["description"], "nose-in at field 2");
}

#[test]
fn test_import_legacy_dry_run_writes_nothing() {
    let eq = Equipage::new();
    let xml = eq.tmp.path().join("equipage.xml");
    fs::write(&xml, LEGACY_XML).unwrap();

    eq.lari()
        .args(["import", "legacy", "--dry-run"])
        .arg(&xml)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!eq.stdout(&["system", "list", "-f", "id"]).contains("CONDOR"));
}

#[test]
fn test_import_legacy_conflict_writes_nothing() {
    let eq = Equipage::new();
    eq.add_component(101, "Existing part", "Inventory");
    let xml = eq.tmp.path().join("equipage.xml");
    fs::write(&xml, LEGACY_XML).unwrap();

    eq.lari()
        .args(["import", "legacy"])
        .arg(&xml)
        .assert()
        .failure();

    assert!(!eq.stdout(&["system", "list", "-f", "id"]).contains("CONDOR"));
    let inventory = eq.stdout(&["system", "show", "Inventory", "-f", "id"]);
    assert!(!inventory.contains('5'));
}

#[test]
fn test_import_legacy_malformed_fails() {
    let eq = Equipage::new();
    let xml = eq.tmp.path().join("broken.xml");
    fs::write(&xml, "<equipage><afslsystem Name=").unwrap();

    eq.lari()
        .args(["import", "legacy"])
        .arg(&xml)
        .assert()
        .failure();
}

#[test]
fn test_export_round_trip() {
    let eq = Equipage::new();
    let xml = eq.tmp.path().join("equipage.xml");
    fs::write(&xml, LEGACY_XML).unwrap();
    eq.lari().args(["import", "legacy"]).arg(&xml).assert().success();

    let out = eq.tmp.path().join("out").join("exported.xml");
    eq.lari().arg("export").arg(&out).assert().success();

    let exported = fs::read_to_string(&out).unwrap();
    assert!(exported.starts_with("<?xml"));
    assert!(exported.contains(r#"Name="CONDOR""#));
    assert!(exported.contains("nose-in at field 2"));
    assert!(exported.contains("swollen cell"));

    // The export loads cleanly into a fresh equipage
    let fresh = Equipage::new();
    fresh.lari().args(["import", "legacy"]).arg(&out).assert().success();
    let ids = fresh.stdout(&["component", "list", "-a", "-f", "id"]);
    let ids: Vec<&str> = ids.lines().collect();
    assert_eq!(ids, vec!["5", "101"]);
}

#[test]
fn test_export_to_stdout() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");
    eq.lari()
        .args(["export", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<equipage>"))
        .stdout(predicate::str::contains(r#"Name="CONDOR""#));
}

#[test]
fn test_import_csv() {
    let eq = Equipage::new();
    eq.add_system("CONDOR", "quad");
    let csv = eq.tmp.path().join("parts.csv");
    fs::write(
        &csv,
        "id,description,system,flight_time\n101,Pixhawk,CONDOR,12\n102,Spare prop,,\n",
    )
    .unwrap();

    eq.lari()
        .args(["import", "csv"])
        .arg(&csv)
        .assert()
        .success();

    assert_eq!(eq.stdout(&["system", "show", "CONDOR", "-f", "id"]).trim(), "101");
    assert!(eq
        .stdout(&["system", "show", "Inventory", "-f", "id"])
        .contains("102"));
}

#[test]
fn test_import_csv_bad_row_writes_nothing() {
    let eq = Equipage::new();
    let csv = eq.tmp.path().join("parts.csv");
    fs::write(&csv, "description,flight_time\nMotor,10\nProp,lots\n").unwrap();

    eq.lari()
        .args(["import", "csv"])
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));

    assert_eq!(eq.stdout(&["component", "list", "-a", "-f", "id"]).trim(), "");
}

#[test]
fn test_import_csv_template() {
    Command::cargo_bin("lari")
        .unwrap()
        .args(["import", "csv", "--template"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id,description"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_set_and_show_local() {
    let eq = Equipage::new();
    eq.lari()
        .args(["config", "set", "default_format", "json"])
        .assert()
        .success();

    assert!(eq.tmp.path().join("lari.yaml").exists());
    eq.lari()
        .args(["config", "show", "default_format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("json"));

    // default_format now applies to list output
    let out = eq.stdout(&["system", "list"]);
    assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
}

#[test]
fn test_config_set_unknown_key_fails() {
    let eq = Equipage::new();
    eq.lari()
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_keys() {
    Command::cargo_bin("lari")
        .unwrap()
        .args(["config", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("database"))
        .stdout(predicate::str::contains("legacy_file"));
}

#[test]
fn test_database_flag_is_respected() {
    let eq = Equipage::new();
    eq.lari()
        .args(["config", "show", "database"])
        .assert()
        .success()
        .stdout(predicate::str::contains("equipage.db"));
}
