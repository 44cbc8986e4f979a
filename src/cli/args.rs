//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, component::ComponentCommands, config::ConfigCommands,
    export::ExportArgs, fleet::FleetArgs, import::ImportCommands, init::InitArgs,
    status::StatusArgs, system::SystemCommands,
};

#[derive(Parser)]
#[command(name = "lari")]
#[command(author, version, about = "LARI equipage tracker")]
#[command(long_about = "Track which components are installed on which UAV systems, \
    with an Inventory pool for unequipped parts, backed by a local SQLite database.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Equipage database (default: from config, then the user data dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the equipage database (or reset it with --force)
    Init(InitArgs),

    /// System (airframe) management
    #[command(subcommand)]
    System(SystemCommands),

    /// Component management
    #[command(subcommand, alias = "cmp")]
    Component(ComponentCommands),

    /// Show every system with its components
    Fleet(FleetArgs),

    /// Import a legacy XML equipage or a CSV component list
    #[command(subcommand)]
    Import(ImportCommands),

    /// Export the fleet as a legacy XML equipage file
    Export(ExportArgs),

    /// Show equipage status dashboard
    Status(StatusArgs),

    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Replace `Auto` with the configured default, or `fallback`
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|s| OutputFormat::from_str(s, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(
            OutputFormat::Json.resolve(Some("yaml"), OutputFormat::Tsv),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::Auto.resolve(Some("MD"), OutputFormat::Tsv),
            OutputFormat::Md
        );
        assert_eq!(
            OutputFormat::Auto.resolve(Some("bogus"), OutputFormat::Tsv),
            OutputFormat::Tsv
        );
        assert_eq!(OutputFormat::Auto.resolve(None, OutputFormat::Yaml), OutputFormat::Yaml);
    }
}
