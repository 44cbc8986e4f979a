//! `lari config` command - Configuration management
//!
//! Provides commands to view and modify LARI configuration.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::config::VALID_KEYS;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (database, legacy_file, default_format)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of ./lari.yaml
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);

    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        if key == "database" {
            println!("{}", config.database_path().display());
            return Ok(());
        }
        return match config.get(key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None if Config::is_valid_key(key) => Err(miette::miette!("Key '{}' is not set", key)),
            None => Err(miette::miette!("Unknown configuration key '{}'", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    println!(
        "  {}: {}",
        style("database").cyan(),
        style(config.database_path().display()).yellow()
    );
    print_config_value("legacy_file", config.get("legacy_file").as_deref());
    print_config_value("default_format", config.default_format.as_deref());

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. --database flag");
    println!("  2. Environment variables (LARI_DATABASE, LARI_LEGACY_FILE)");
    println!("  3. Local config (./lari.yaml)");
    println!("  4. Global config (~/.config/lari/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    if !Config::is_valid_key(&args.key) {
        return Err(miette::miette!(
            help = "run `lari config keys` to list valid keys",
            "Unknown configuration key '{}'",
            args.key
        ));
    }

    let config_path = if args.global {
        get_global_config_path()?
    } else {
        Config::local_config_path()
    };

    // Load existing config or create new
    let mut config_map: serde_yml::Value = if config_path.exists() {
        let content = fs::read_to_string(&config_path).into_diagnostic()?;
        let parsed: serde_yml::Value = serde_yml::from_str(&content)
            .unwrap_or(serde_yml::Value::Mapping(Default::default()));
        if parsed.is_null() {
            serde_yml::Value::Mapping(Default::default())
        } else {
            parsed
        }
    } else {
        serde_yml::Value::Mapping(Default::default())
    };

    match config_map {
        serde_yml::Value::Mapping(ref mut map) => {
            map.insert(
                serde_yml::Value::String(args.key.clone()),
                serde_yml::Value::String(args.value.clone()),
            );
        }
        _ => {
            return Err(miette::miette!(
                "{} is not a YAML mapping",
                config_path.display()
            ))
        }
    }

    // Make sure the result still loads as a Config
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    Config::from_yaml(&yaml).into_diagnostic()?;

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }
    }
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "local" };
    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope
    );

    Ok(())
}

fn run_path() -> Result<()> {
    let global_path = get_global_config_path()?;
    let local_path = Config::local_config_path();

    println!("{}", style("Configuration file paths:").bold());
    println!();
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    print_exists(global_path.exists());
    println!();
    println!("  {} {}", style("Local:").cyan(), local_path.display());
    print_exists(local_path.exists());

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'lari config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

fn get_global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn print_exists(exists: bool) {
    if exists {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}
