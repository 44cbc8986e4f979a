//! LARI: equipage tracking for a UAV fleet
//!
//! Systems (airframes) own components (parts). Components move between the
//! Inventory pool and operational systems; the SQLite-backed
//! [`core::EquipageStore`] keeps both tables consistent.

pub mod cli;
pub mod core;
pub mod entities;
pub mod legacy;
