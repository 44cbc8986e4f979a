//! `lari system` command - Airframe management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::component::{component_rows, COMPONENT_COLUMNS};
use crate::cli::helpers::{confirm, open_store, output_format};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{EquipageError, INVENTORY_SYSTEM};
use crate::entities::{format_minutes, AfslSystem, WingType};

#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Register a new system
    Add(AddArgs),

    /// Remove a system, returning its components to Inventory
    #[command(alias = "rm")]
    Remove(RemoveArgs),

    /// Show a system with its components
    Show(ShowArgs),

    /// List all systems
    #[command(alias = "ls")]
    List,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Unique system name
    pub name: String,

    /// Free-text description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Airframe category (fixed-wing, quad, octo, none, unspecified)
    #[arg(long, short = 'w', default_value = "unspecified")]
    pub wing_type: WingType,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// System name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// System name
    pub name: String,
}

const SYSTEM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 20),
    ColumnDef::new("wing", "WING TYPE", 14),
    ColumnDef::new("components", "PARTS", 6),
    ColumnDef::new("flight_time", "FLIGHT TIME", 12),
    ColumnDef::new("started", "STARTED", 10),
    ColumnDef::new("description", "DESCRIPTION", 40),
];

/// Run a system subcommand
pub fn run(cmd: SystemCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SystemCommands::Add(args) => run_add(args, global),
        SystemCommands::Remove(args) => run_remove(args, global),
        SystemCommands::Show(args) => run_show(args, global),
        SystemCommands::List => run_list(global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(miette::miette!("System name cannot be empty"));
    }

    let mut store = open_store(global)?;
    let system = AfslSystem::new(name, args.description, args.wing_type);
    store.add_system(&system)?;

    if !global.quiet {
        println!(
            "{} Added system {} ({})",
            style("✓").green(),
            style(&system.name).cyan(),
            system.wing_type
        );
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    if args.name == INVENTORY_SYSTEM {
        return Err(EquipageError::InventoryProtected.into());
    }

    let mut store = open_store(global)?;
    let system = store
        .get_system(&args.name)?
        .ok_or_else(|| EquipageError::SystemNotFound {
            name: args.name.clone(),
        })?;

    let prompt = format!(
        "Remove system '{}' and return {} component(s) to Inventory?",
        system.name,
        system.components.len()
    );
    if !confirm(&prompt, args.yes)? {
        println!("{} Aborted, nothing changed", style("!").yellow());
        return Ok(());
    }

    let returned = store.remove_system(&args.name)?;

    if !global.quiet {
        println!(
            "{} Removed system {}; {} component(s) returned to {}",
            style("✓").green(),
            style(&args.name).cyan(),
            style(returned).yellow(),
            INVENTORY_SYSTEM
        );
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let system = store
        .get_system(&args.name)?
        .ok_or_else(|| EquipageError::SystemNotFound {
            name: args.name.clone(),
        })?;

    match output_format(global, OutputFormat::Yaml) {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&system).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&system).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for component in &system.components {
                println!("{}", component.id);
            }
        }
        format => {
            if format == OutputFormat::Tsv {
                print_system_header(&system);
            }
            let rows = component_rows(&system.components);
            TableFormatter::new(COMPONENT_COLUMNS, "component")
                .output(&rows, format)?;
        }
    }
    Ok(())
}

fn print_system_header(system: &AfslSystem) {
    println!("{}", style(&system.name).bold().cyan());
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Wing type").bold(), system.wing_type);
    if !system.description.is_empty() {
        println!("{}: {}", style("Description").bold(), system.description);
    }
    println!(
        "{}: {}",
        style("Started").bold(),
        system.start_date.format("%Y-%m-%d")
    );
    println!(
        "{}: {}",
        style("Flight time").bold(),
        format_minutes(system.total_flight_time())
    );
    println!();
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let fleet = store.fleet()?;

    match output_format(global, OutputFormat::Tsv) {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&fleet).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&fleet).into_diagnostic()?);
        }
        format => {
            let rows: Vec<TableRow> = fleet.iter().map(system_row).collect();
            TableFormatter::new(SYSTEM_COLUMNS, "system").output(&rows, format)?;
        }
    }
    Ok(())
}

fn system_row(system: &AfslSystem) -> TableRow {
    let description = if system.description.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(system.description.clone())
    };
    TableRow::new(system.name.clone())
        .cell("name", CellValue::Key(system.name.clone()))
        .cell("wing", CellValue::Wing(system.wing_type))
        .cell("components", CellValue::Number(system.components.len() as i64))
        .cell("flight_time", CellValue::Minutes(system.total_flight_time()))
        .cell("started", CellValue::Date(system.start_date))
        .cell("description", description)
}
