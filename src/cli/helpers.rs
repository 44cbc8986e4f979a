//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, EquipageStore};

/// Configuration with the `--database` flag applied on top
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    if let Some(ref path) = global.database {
        config.database = Some(path.clone());
    }
    config
}

/// Database path for this invocation
pub fn database_path(global: &GlobalOpts) -> PathBuf {
    load_config(global).database_path()
}

/// Open the equipage store for this invocation
pub fn open_store(global: &GlobalOpts) -> Result<EquipageStore> {
    let path = database_path(global);
    debug!(path = %path.display(), "opening equipage store");
    Ok(EquipageStore::open(&path)?)
}

/// Effective output format, honouring `default_format` from config
pub fn output_format(global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
    let config = load_config(global);
    global
        .format
        .resolve(config.default_format.as_deref(), fallback)
}

/// Ask before doing something destructive; `assume_yes` skips the prompt
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
