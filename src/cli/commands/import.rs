//! `lari import` command - Legacy XML equipage and CSV component lists
//!
//! Both importers build one batch and hand it to the store, so a file is
//! imported completely or not at all.

use clap::Subcommand;
use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, open_store};
use crate::cli::GlobalOpts;
use crate::core::store::{ImportBatch, ImportCounts};
use crate::core::INVENTORY_SYSTEM;
use crate::entities::Component;
use crate::legacy;

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Import a legacy XML equipage file
    Legacy(LegacyArgs),

    /// Import components from a CSV file
    Csv(CsvArgs),
}

#[derive(clap::Args, Debug)]
pub struct LegacyArgs {
    /// XML file (default: `legacy_file` from config)
    pub file: Option<PathBuf>,

    /// Parse and report without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct CsvArgs {
    /// CSV file to import
    #[arg(required_unless_present = "template")]
    pub file: Option<PathBuf>,

    /// System for rows without a `system` column value
    #[arg(long, short = 's', default_value = INVENTORY_SYSTEM)]
    pub system: String,

    /// Print a CSV template and exit
    #[arg(long)]
    pub template: bool,

    /// Validate CSV without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Recognized CSV columns; only `description` is required
pub const CSV_HEADERS: &[&str] = &[
    "id",
    "description",
    "name",
    "serial_number",
    "flight_time",
    "location",
    "history",
    "damaged",
    "active",
    "system",
];

/// Run an import subcommand
pub fn run(cmd: ImportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ImportCommands::Legacy(args) => run_legacy(args, global),
        ImportCommands::Csv(args) => run_csv(args, global),
    }
}

fn run_legacy(args: LegacyArgs, global: &GlobalOpts) -> Result<()> {
    let file = match args.file {
        Some(file) => file,
        None => load_config(global).legacy_file.ok_or_else(|| {
            miette::miette!(
                help = "pass a FILE or run `lari config set legacy_file PATH`",
                "No legacy equipage file given"
            )
        })?,
    };

    let doc = legacy::read_equipage_file(&file)?;

    if args.dry_run {
        let batch = doc.to_batch()?;
        println!(
            "{} {} parsed: {} system(s), {} loose Inventory component(s), {} note(s), {} crash record(s)",
            style("→").blue(),
            style(file.display()).cyan(),
            batch.systems.len(),
            batch.components.len(),
            batch.notes.len(),
            batch.crash_records.len()
        );
        println!("{}", style("Dry run: nothing written").dim());
        return Ok(());
    }

    let mut store = open_store(global)?;
    let counts = legacy::import_into(&mut store, &doc)?;
    print_counts(&counts, &file, global);
    Ok(())
}

fn run_csv(args: CsvArgs, global: &GlobalOpts) -> Result<()> {
    if args.template {
        println!("{}", CSV_HEADERS.join(","));
        println!("101,Pixhawk 2.1,FC,PX-0042,30,hangar,,false,true,{}", INVENTORY_SYSTEM);
        return Ok(());
    }

    let file = args
        .file
        .ok_or_else(|| miette::miette!("CSV file required"))?;
    let reader = std::fs::File::open(&file).into_diagnostic()?;

    let mut store = open_store(global)?;
    let first_id = store.allocate_component_id()?;
    let components = parse_components(reader, &args.system, first_id)
        .map_err(|message| miette::miette!("{}: {}", file.display(), message))?;

    if args.dry_run {
        println!(
            "{} {} valid row(s) in {}",
            style("→").blue(),
            components.len(),
            style(file.display()).cyan()
        );
        println!("{}", style("Dry run: nothing written").dim());
        return Ok(());
    }

    let batch = ImportBatch {
        components,
        ..Default::default()
    };
    let counts = store.import_batch(&batch)?;
    print_counts(&counts, &file, global);
    Ok(())
}

fn print_counts(counts: &ImportCounts, file: &std::path::Path, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    println!(
        "{} Imported {}",
        style("✓").green(),
        style(file.display()).cyan()
    );
    println!("  Systems:        {}", style(counts.systems).yellow());
    println!("  Components:     {}", style(counts.components).yellow());
    println!("  Notes:          {}", style(counts.notes).yellow());
    println!("  Crash records:  {}", style(counts.crash_records).yellow());
}

/// Build a map from header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a non-empty field value from a CSV record
fn get_field(record: &StringRecord, header_map: &HashMap<String, usize>, field: &str) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Parse CSV rows into components
///
/// Rows without an id get consecutive ids starting at `first_id`. Errors
/// name the offending line so the file can be fixed and re-run.
pub fn parse_components<R: Read>(
    reader: R,
    default_system: &str,
    first_id: i64,
) -> std::result::Result<Vec<Component>, String> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
    let header_map = build_header_map(&headers);
    if !header_map.contains_key("description") {
        return Err("missing required column 'description'".to_string());
    }

    let mut next_id = Some(first_id);
    let mut components = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        // Header is line 1
        let line = idx + 2;
        let record = result.map_err(|e| format!("line {}: {}", line, e))?;

        let description = get_field(&record, &header_map, "description")
            .ok_or_else(|| format!("line {}: description is empty", line))?;

        let id = match get_field(&record, &header_map, "id") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| format!("line {}: id '{}' is not an integer", line, raw))?,
            None => next_id.ok_or_else(|| {
                format!("line {}: no id left after {}", line, i64::MAX)
            })?,
        };
        // None once i64::MAX is taken
        next_id = match (next_id, id.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };

        let flight_time = match get_field(&record, &header_map, "flight_time") {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| format!("line {}: flight_time '{}' is not a number", line, raw))?,
            None => 0.0,
        };

        let mut component = Component::new(id, description)
            .with_name(get_field(&record, &header_map, "name").unwrap_or_default())
            .with_serial_number(get_field(&record, &header_map, "serial_number").unwrap_or_default())
            .with_flight_time(flight_time)
            .with_location(get_field(&record, &header_map, "location").unwrap_or_default());
        component.history = get_field(&record, &header_map, "history").unwrap_or_default();
        component.system = get_field(&record, &header_map, "system")
            .unwrap_or_else(|| default_system.to_string());

        for (field, target) in [
            ("damaged", &mut component.damaged),
            ("active", &mut component.active),
        ] {
            if let Some(raw) = get_field(&record, &header_map, field) {
                *target = parse_bool(&raw)
                    .ok_or_else(|| format!("line {}: {} '{}' is not true/false", line, field, raw))?;
            }
        }

        component
            .validate()
            .map_err(|e| format!("line {}: {}", line, e))?;
        components.push(component);
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components_assigns_ids_and_defaults() {
        let csv = "description,id,system,damaged\n\
                   Pixhawk,101,CONDOR,no\n\
                   Spare prop,,,yes\n\
                   GPS,,,\n";
        let components = parse_components(csv.as_bytes(), INVENTORY_SYSTEM, 7).unwrap();

        assert_eq!(components.len(), 3);
        assert_eq!(components[0].id, 101);
        assert_eq!(components[0].system, "CONDOR");
        assert_eq!(components[1].id, 102);
        assert!(components[1].damaged);
        assert_eq!(components[1].system, INVENTORY_SYSTEM);
        assert_eq!(components[2].id, 103);
        assert!(components[2].active);
    }

    #[test]
    fn test_parse_components_largest_id_leaves_none_to_assign() {
        let csv = format!("description,id\nMotor,{}\n", i64::MAX);
        let components = parse_components(csv.as_bytes(), INVENTORY_SYSTEM, 1).unwrap();
        assert_eq!(components[0].id, i64::MAX);

        let csv = format!("description,id\nMotor,{}\nProp,\n", i64::MAX);
        let err = parse_components(csv.as_bytes(), INVENTORY_SYSTEM, 1).unwrap_err();
        assert!(err.starts_with("line 3"), "{}", err);
        assert!(err.contains("no id left"));
    }

    #[test]
    fn test_parse_components_requires_description_column() {
        let err = parse_components("id,name\n1,x\n".as_bytes(), INVENTORY_SYSTEM, 1).unwrap_err();
        assert!(err.contains("description"));
    }

    #[test]
    fn test_parse_components_reports_line() {
        let csv = "description,flight_time\nMotor,12\nProp,lots\n";
        let err = parse_components(csv.as_bytes(), INVENTORY_SYSTEM, 1).unwrap_err();
        assert!(err.starts_with("line 3"), "{}", err);
    }

    #[test]
    fn test_parse_components_rejects_negative_flight_time() {
        let csv = "description,flight_time\nMotor,-4\n";
        let err = parse_components(csv.as_bytes(), INVENTORY_SYSTEM, 1).unwrap_err();
        assert!(err.contains("negative"));
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let csv = "Description,Serial_Number\nESC,SN-9\n";
        let components = parse_components(csv.as_bytes(), INVENTORY_SYSTEM, 1).unwrap();
        assert_eq!(components[0].serial_number, "SN-9");
    }
}
