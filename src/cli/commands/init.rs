//! `lari init` command - Create or reset the equipage database

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::cli::helpers::{confirm, database_path};
use crate::cli::GlobalOpts;
use crate::core::{EquipageError, EquipageStore, INVENTORY_SYSTEM};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Drop every table and start over with an empty equipage
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation prompt for --force
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = database_path(global);
    let existed = path.exists();

    if existed && !args.force {
        // Opening verifies the schema without touching data
        EquipageStore::open(&path)?;
        println!(
            "{} Equipage database already exists at {}",
            style("!").yellow(),
            style(path.display()).cyan()
        );
        println!();
        println!("Use {} to reinitialize", style("lari init --force").yellow());
        return Ok(());
    }

    if existed {
        let prompt = format!(
            "Delete every system, component, note and crash record in {}?",
            path.display()
        );
        if !confirm(&prompt, args.yes)? {
            println!("{} Aborted, nothing changed", style("!").yellow());
            return Ok(());
        }

        // A file with a foreign or damaged schema cannot be opened at all
        // and is replaced wholesale
        match EquipageStore::open(&path) {
            Ok(mut store) => store.reinitialize()?,
            Err(e @ EquipageError::SchemaIntegrity { .. }) => {
                warn!(error = %e, "existing file is not a usable equipage, replacing it");
                remove_database_files(&path)?;
                EquipageStore::open(&path)?;
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        EquipageStore::open(&path)?;
    }

    if !global.quiet {
        println!(
            "{} Initialized equipage database at {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
        println!();
        println!("The {} system holds unequipped parts.", style(INVENTORY_SYSTEM).cyan());
        println!("Next steps:");
        println!(
            "  {} Register an airframe",
            style("lari system add NAME --wing-type quad").yellow()
        );
        println!(
            "  {} Add a part to Inventory",
            style("lari component add \"description\"").yellow()
        );
        println!(
            "  {} Migrate a legacy XML equipage",
            style("lari import legacy FILE").yellow()
        );
    }

    Ok(())
}

/// Remove a database file with its WAL and shared-memory siblings
fn remove_database_files(path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        let file = PathBuf::from(name);
        if file.exists() {
            std::fs::remove_file(&file).into_diagnostic()?;
        }
    }
    Ok(())
}
