//! `lari component` command - Parts, their owners and their records

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{confirm, open_store, output_format, truncate_str};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{EquipageError, INVENTORY_SYSTEM};
use crate::entities::{format_minutes, Component, CrashRecord, Note};

#[derive(Subcommand, Debug)]
pub enum ComponentCommands {
    /// Add a component (to Inventory unless --system is given)
    Add(AddArgs),

    /// Show a component with its notes and crash history
    Show(ShowArgs),

    /// List components
    #[command(alias = "ls")]
    List(ListArgs),

    /// Move a component to another system
    #[command(alias = "mv")]
    Move(MoveArgs),

    /// Edit descriptive fields of a component
    Update(UpdateArgs),

    /// Add flight time to a component
    Log(LogArgs),

    /// Attach a note to a component
    Note(NoteArgs),

    /// Record a crash involving a component
    Crash(CrashArgs),

    /// Delete a component together with its notes and crash history
    #[command(alias = "rm")]
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// What the part is
    pub description: String,

    /// Part number (default: next free id)
    #[arg(long)]
    pub id: Option<i64>,

    /// Short name
    #[arg(long, short = 'n', default_value = "")]
    pub name: String,

    /// Manufacturer serial number
    #[arg(long, default_value = "")]
    pub serial: String,

    /// Flight time already on the part, in minutes
    #[arg(long, default_value_t = 0.0)]
    pub flight_time: f64,

    /// Where the part physically is
    #[arg(long, short = 'l', default_value = "")]
    pub location: String,

    /// System to attach it to
    #[arg(long, short = 's', default_value = INVENTORY_SYSTEM)]
    pub system: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Component id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only components on this system
    #[arg(long, short = 's')]
    pub system: Option<String>,

    /// Only damaged components
    #[arg(long)]
    pub damaged: bool,

    /// Include inactive components
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// Component id
    pub id: i64,

    /// Destination system
    #[arg(long, short = 't')]
    pub to: String,

    /// Expected current system (default: wherever it is now)
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Component id
    pub id: i64,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub serial: Option<String>,

    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Previous airframes and removal dates
    #[arg(long)]
    pub history: Option<String>,

    #[arg(long)]
    pub damaged: Option<bool>,

    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Component id
    pub id: i64,

    /// Minutes flown
    pub minutes: f64,
}

#[derive(clap::Args, Debug)]
pub struct NoteArgs {
    /// Component id
    pub id: i64,

    /// One-line summary
    pub summary: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
}

#[derive(clap::Args, Debug)]
pub struct CrashArgs {
    /// Component id
    pub id: i64,

    /// One-line summary
    pub summary: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Where it happened
    #[arg(long, short = 'l', default_value = "")]
    pub location: String,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Component id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub const COMPONENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("description", "DESCRIPTION", 32),
    ColumnDef::new("system", "SYSTEM", 16),
    ColumnDef::new("serial", "SERIAL", 16),
    ColumnDef::new("flight_time", "FLIGHT TIME", 12),
    ColumnDef::new("damaged", "DAMAGED", 8),
    ColumnDef::new("active", "ACTIVE", 7),
];

/// Full component detail for YAML/JSON output
#[derive(Serialize)]
struct ComponentDetail<'a> {
    #[serde(flatten)]
    component: &'a Component,
    notes: &'a [Note],
    crash_history: &'a [CrashRecord],
}

/// Run a component subcommand
pub fn run(cmd: ComponentCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ComponentCommands::Add(args) => run_add(args, global),
        ComponentCommands::Show(args) => run_show(args, global),
        ComponentCommands::List(args) => run_list(args, global),
        ComponentCommands::Move(args) => run_move(args, global),
        ComponentCommands::Update(args) => run_update(args, global),
        ComponentCommands::Log(args) => run_log(args, global),
        ComponentCommands::Note(args) => run_note(args, global),
        ComponentCommands::Crash(args) => run_crash(args, global),
        ComponentCommands::Remove(args) => run_remove(args, global),
    }
}

/// Table rows for a list of components
pub fn component_rows(components: &[Component]) -> Vec<TableRow> {
    components
        .iter()
        .map(|c| {
            let serial = if c.serial_number.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(c.serial_number.clone())
            };
            TableRow::new(c.id.to_string())
                .cell("id", CellValue::Key(c.id.to_string()))
                .cell("description", CellValue::Text(c.description.clone()))
                .cell("system", CellValue::Text(c.system.clone()))
                .cell("serial", serial)
                .cell("flight_time", CellValue::Minutes(c.flight_time))
                .cell("damaged", CellValue::Damaged(c.damaged))
                .cell("active", CellValue::Active(c.active))
        })
        .collect()
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let id = match args.id {
        Some(id) => id,
        None => store.allocate_component_id()?,
    };

    let component = Component::new(id, args.description)
        .with_name(args.name)
        .with_serial_number(args.serial)
        .with_flight_time(args.flight_time)
        .with_location(args.location);
    store.add_component(&component, &args.system)?;

    if global.quiet {
        println!("{}", id);
    } else {
        println!(
            "{} Added component {} to {}",
            style("✓").green(),
            style(id).cyan(),
            style(&args.system).yellow()
        );
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let component = store
        .get_component(args.id)?
        .ok_or_else(|| EquipageError::component_not_found(args.id))?;
    let notes = store.notes_for_component(args.id)?;
    let crashes = store.crash_history_for_component(args.id)?;

    let detail = ComponentDetail {
        component: &component,
        notes: &notes,
        crash_history: &crashes,
    };

    match output_format(global, OutputFormat::Yaml) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&detail).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", component.id),
        OutputFormat::Tsv | OutputFormat::Md | OutputFormat::Csv => {
            print_component(&component, &notes, &crashes);
        }
        _ => {
            print!("{}", serde_yml::to_string(&detail).into_diagnostic()?);
        }
    }
    Ok(())
}

fn print_component(component: &Component, notes: &[Note], crashes: &[CrashRecord]) {
    let title = if component.name.is_empty() {
        component.description.clone()
    } else {
        format!("{} ({})", component.name, component.description)
    };
    println!("{} {}", style(component.id).bold().cyan(), style(title).bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("System").bold(), style(&component.system).yellow());
    if !component.serial_number.is_empty() {
        println!("{}: {}", style("Serial").bold(), component.serial_number);
    }
    println!("{}: {}", style("Flight time").bold(), component.flight_time_display());
    if !component.location.is_empty() {
        println!("{}: {}", style("Location").bold(), component.location);
    }
    if !component.history.is_empty() {
        println!("{}: {}", style("History").bold(), component.history);
    }
    let mut flags = Vec::new();
    if component.damaged {
        flags.push(style("damaged").red().bold().to_string());
    }
    if !component.active {
        flags.push(style("inactive").dim().to_string());
    }
    if !flags.is_empty() {
        println!("{}: {}", style("Flags").bold(), flags.join(", "));
    }
    println!(
        "{}: {}",
        style("Started").bold(),
        component.start_date.format("%Y-%m-%d")
    );

    if !notes.is_empty() {
        println!();
        println!("{}", style("Notes").bold().underlined());
        for note in notes {
            if note.description.is_empty() {
                println!("  • {}", note.summary);
            } else {
                println!(
                    "  • {}: {}",
                    note.summary,
                    style(truncate_str(&note.description, 70)).dim()
                );
            }
        }
    }

    if !crashes.is_empty() {
        println!();
        println!("{}", style("Crash history").bold().underlined());
        for crash in crashes {
            let place = if crash.location.is_empty() {
                String::new()
            } else {
                format!(" @ {}", crash.location)
            };
            println!(
                "  {} {}{}",
                style(crash.time.format("%Y-%m-%d")).red(),
                crash.summary,
                style(place).dim()
            );
            if !crash.description.is_empty() {
                println!("      {}", style(truncate_str(&crash.description, 70)).dim());
            }
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;

    let fleet = match args.system {
        Some(ref name) => {
            let system = store
                .get_system(name)?
                .ok_or_else(|| EquipageError::SystemNotFound { name: name.clone() })?;
            vec![system]
        }
        None => store.fleet()?,
    };

    let mut components: Vec<Component> = fleet
        .into_iter()
        .flat_map(|s| s.components)
        .filter(|c| args.all || c.active)
        .filter(|c| !args.damaged || c.damaged)
        .collect();
    components.sort_by_key(|c| c.id);

    match output_format(global, OutputFormat::Tsv) {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&components).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&components).into_diagnostic()?);
        }
        format => {
            let formatter = TableFormatter::new(COMPONENT_COLUMNS, "component");
            let formatter = if global.quiet {
                formatter.without_summary()
            } else {
                formatter
            };
            formatter.output(&component_rows(&components), format)?;
        }
    }
    Ok(())
}

fn run_move(args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;

    let from = match args.from {
        Some(from) => from,
        None => {
            store
                .get_component(args.id)?
                .ok_or_else(|| EquipageError::component_not_found(args.id))?
                .system
        }
    };

    store.move_component(args.id, &from, &args.to)?;

    if !global.quiet {
        if from == args.to {
            println!(
                "{} Component {} is already on {}",
                style("!").yellow(),
                style(args.id).cyan(),
                style(&args.to).yellow()
            );
        } else {
            println!(
                "{} Moved component {} from {} to {}",
                style("✓").green(),
                style(args.id).cyan(),
                style(&from).yellow(),
                style(&args.to).yellow()
            );
        }
    }
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let mut component = store
        .get_component(args.id)?
        .ok_or_else(|| EquipageError::component_not_found(args.id))?;

    let mut changed = Vec::new();
    if let Some(name) = args.name {
        component.name = name;
        changed.push("name");
    }
    if let Some(description) = args.description {
        component.description = description;
        changed.push("description");
    }
    if let Some(serial) = args.serial {
        component.serial_number = serial;
        changed.push("serial");
    }
    if let Some(location) = args.location {
        component.location = location;
        changed.push("location");
    }
    if let Some(history) = args.history {
        component.history = history;
        changed.push("history");
    }
    if let Some(damaged) = args.damaged {
        component.damaged = damaged;
        changed.push("damaged");
    }
    if let Some(active) = args.active {
        component.active = active;
        changed.push("active");
    }

    if changed.is_empty() {
        return Err(miette::miette!(
            help = "pass at least one of --name, --description, --serial, --location, --history, --damaged, --active",
            "Nothing to update"
        ));
    }

    store.update_component(&component)?;

    if !global.quiet {
        println!(
            "{} Updated component {} ({})",
            style("✓").green(),
            style(args.id).cyan(),
            changed.join(", ")
        );
    }
    Ok(())
}

fn run_log(args: LogArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let total = store.log_flight_time(args.id, args.minutes)?;

    if global.quiet {
        println!("{}", total);
    } else {
        println!(
            "{} Logged {} min on component {}; total {}",
            style("✓").green(),
            args.minutes,
            style(args.id).cyan(),
            style(format_minutes(total)).yellow()
        );
    }
    Ok(())
}

fn run_note(args: NoteArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let note = store.add_note(args.id, &args.summary, &args.description)?;

    if !global.quiet {
        println!(
            "{} Added note {} to component {}",
            style("✓").green(),
            note,
            style(args.id).cyan()
        );
    }
    Ok(())
}

fn run_crash(args: CrashArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let record = CrashRecord::new(args.id, args.summary)
        .with_description(args.description)
        .with_location(args.location);
    let crash = store.add_crash_record(&record)?;

    if !global.quiet {
        println!(
            "{} Recorded crash {} for component {}",
            style("✓").green(),
            crash,
            style(args.id).cyan()
        );
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let component = store
        .get_component(args.id)?
        .ok_or_else(|| EquipageError::component_not_found(args.id))?;

    let prompt = format!(
        "Delete component {} ({}) and all of its notes and crash history?",
        component.id, component.description
    );
    if !confirm(&prompt, args.yes)? {
        println!("{} Aborted, nothing changed", style("!").yellow());
        return Ok(());
    }

    store.remove_component(args.id)?;

    if !global.quiet {
        println!(
            "{} Removed component {} from {}",
            style("✓").green(),
            style(args.id).cyan(),
            style(&component.system).yellow()
        );
    }
    Ok(())
}
