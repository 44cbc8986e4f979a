//! Domain entities hydrated from the equipage store

pub mod component;
pub mod record;
pub mod system;

pub use component::{format_minutes, Component};
pub use record::{CrashRecord, Note};
pub use system::{AfslSystem, ParseWingTypeError, WingType};
