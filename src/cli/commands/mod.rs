//! CLI command implementations

pub mod completions;
pub mod component;
pub mod config;
pub mod export;
pub mod fleet;
pub mod import;
pub mod init;
pub mod status;
pub mod system;
