//! Core module - store, configuration, errors and logging

pub mod config;
pub mod error;
pub mod logging;
pub mod store;

pub use config::Config;
pub use error::{EquipageError, Result};
pub use store::{EquipageStore, StoreStats, INVENTORY_SYSTEM};
