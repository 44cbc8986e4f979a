//! `lari fleet` command - Every system and what is installed on it

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::component::{component_rows, COMPONENT_COLUMNS};
use crate::cli::helpers::{open_store, output_format, truncate_str};
use crate::cli::table::TableFormatter;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{format_minutes, AfslSystem, Component};

#[derive(clap::Args, Debug)]
pub struct FleetArgs {
    /// Leave out systems with no components
    #[arg(long)]
    pub hide_empty: bool,
}

pub fn run(args: FleetArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut fleet = store.fleet()?;
    if args.hide_empty {
        fleet.retain(|s| !s.components.is_empty());
    }

    match output_format(global, OutputFormat::Tsv) {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&fleet).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&fleet).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for system in &fleet {
                println!("{}", system.name);
            }
        }
        OutputFormat::Tsv => print_tree(&fleet),
        format => {
            let components: Vec<Component> =
                fleet.into_iter().flat_map(|s| s.components).collect();
            TableFormatter::new(COMPONENT_COLUMNS, "component")
                .output(&component_rows(&components), format)?;
        }
    }
    Ok(())
}

fn print_tree(fleet: &[AfslSystem]) {
    for (i, system) in fleet.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} {} {}",
            style(&system.name).bold().cyan(),
            style(format!("({})", system.wing_type)).dim(),
            style(format!(
                "{} part(s), {}",
                system.components.len(),
                format_minutes(system.total_flight_time())
            ))
            .dim()
        );

        let count = system.components.len();
        for (j, component) in system.components.iter().enumerate() {
            let branch = if j + 1 == count { "└─" } else { "├─" };
            let mut line = format!(
                "  {} {:<8} {:<36} {:>9}",
                style(branch).dim(),
                style(component.id).cyan(),
                truncate_str(&component.description, 34),
                component.flight_time_display()
            );
            if component.damaged {
                line.push_str(&format!(" {}", style("damaged").red().bold()));
            }
            if !component.active {
                line.push_str(&format!(" {}", style("inactive").dim()));
            }
            println!("{}", line);
        }
    }
}
