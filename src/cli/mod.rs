//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod table;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

use miette::Result;

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &global),
        Commands::System(cmd) => commands::system::run(cmd, &global),
        Commands::Component(cmd) => commands::component::run(cmd, &global),
        Commands::Fleet(args) => commands::fleet::run(args, &global),
        Commands::Import(cmd) => commands::import::run(cmd, &global),
        Commands::Export(args) => commands::export::run(args, &global),
        Commands::Status(args) => commands::status::run(args, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
