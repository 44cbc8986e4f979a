//! `lari export` command - Write the fleet as a legacy XML equipage

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, open_store};
use crate::cli::GlobalOpts;
use crate::legacy;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output file (default: `legacy_file` from config; `-` for stdout)
    pub file: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;

    let file = match args.file {
        Some(file) => file,
        None => load_config(global).legacy_file.ok_or_else(|| {
            miette::miette!(
                help = "pass a FILE (or `-`) or run `lari config set legacy_file PATH`",
                "No export file given"
            )
        })?,
    };

    if file.as_os_str() == "-" {
        print!("{}", legacy::export_fleet(&store)?.to_xml()?);
        return Ok(());
    }

    let systems = legacy::write_equipage_file(&file, &store)?;

    if !global.quiet {
        println!(
            "{} Exported {} system(s) to {}",
            style("✓").green(),
            style(systems).yellow(),
            style(file.display()).cyan()
        );
    }
    Ok(())
}
