//! `lari status` command - Equipage status dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{open_store, output_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::StoreStats;
use crate::entities::{format_minutes, AfslSystem};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Show per-system breakdown
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    database: &'a str,
    #[serde(flatten)]
    stats: &'a StoreStats,
    vehicles: usize,
    equipped_components: usize,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let stats = store.statistics()?;

    match output_format(global, OutputFormat::Tsv) {
        format @ (OutputFormat::Json | OutputFormat::Yaml) => {
            let report = StatusReport {
                database: store.location(),
                stats: &stats,
                vehicles: stats.vehicles(),
                equipped_components: stats.equipped_components(),
            };
            if format == OutputFormat::Yaml {
                print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
            } else {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            }
        }
        _ => {
            let width = 68;

            println!("{}", style("LARI Equipage Status").bold().underlined());
            println!("{}", style(store.location()).dim());
            println!("{}", "═".repeat(width));
            println!();

            print_two_columns(
                "FLEET",
                &[
                    format!("Systems:      {}", style(stats.vehicles()).cyan()),
                    format!("Components:   {}", style(stats.components).cyan()),
                    format!("  equipped:   {}", stats.equipped_components()),
                    format!("  inventory:  {}", stats.inventory_components),
                ],
                "CONDITION",
                &[
                    format!("Damaged:      {}", damaged_style(stats.damaged_components)),
                    format!("Notes:        {}", stats.notes),
                    format!("Crashes:      {}", stats.crash_records),
                    format!("Flight time:  {}", format_minutes(stats.total_flight_time)),
                ],
            );

            if args.detailed {
                println!();
                let fleet = store.fleet()?;
                let lines: Vec<String> = fleet.iter().map(system_line).collect();
                print_section("SYSTEMS", &lines);
            }

            println!();
            println!("{}", "═".repeat(width));
        }
    }

    Ok(())
}

fn damaged_style(count: usize) -> String {
    if count == 0 {
        style(count).green().to_string()
    } else {
        style(count).red().bold().to_string()
    }
}

fn system_line(system: &AfslSystem) -> String {
    let damaged = system.components.iter().filter(|c| c.damaged).count();
    let mut line = format!(
        "{:<20} {:<12} {:>3} part(s)  {}",
        system.name,
        system.wing_type.display_name(),
        system.components.len(),
        format_minutes(system.total_flight_time())
    );
    if damaged > 0 {
        line.push_str(&format!("  {}", style(format!("{} damaged", damaged)).red()));
    }
    line
}

fn print_two_columns(title1: &str, lines1: &[String], title2: &str, lines2: &[String]) {
    let col_width = 32;

    println!("{:<col_width$} {}", style(title1).bold(), style(title2).bold());
    println!("{:-<col_width$} {:-<col_width$}", "", "");

    let max_lines = lines1.len().max(lines2.len());

    for i in 0..max_lines {
        let l1 = lines1.get(i).map(|s| s.as_str()).unwrap_or("");
        let l2 = lines2.get(i).map(|s| s.as_str()).unwrap_or("");
        println!("  {:<30} {}", l1, l2);
    }
}

fn print_section(title: &str, lines: &[String]) {
    println!("{}", style(title).bold());
    println!("{:-<64}", "");
    for line in lines {
        println!("  {}", line);
    }
}
