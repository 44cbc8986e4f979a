//! Component entity type - Trackable parts that move between systems

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::store::INVENTORY_SYSTEM;

/// A physical part with identity, flight-time accumulation and an owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Unique component id (part number)
    pub id: i64,

    /// Short name
    #[serde(default)]
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Manufacturer serial number
    #[serde(default)]
    pub serial_number: String,

    /// Cumulative flight time in minutes
    #[serde(default)]
    pub flight_time: f64,

    /// Where the part physically is
    #[serde(default)]
    pub location: String,

    /// Previous airframes and removal dates
    #[serde(default)]
    pub history: String,

    #[serde(default)]
    pub damaged: bool,

    #[serde(default = "default_active")]
    pub active: bool,

    /// When the part entered the equipage
    pub start_date: DateTime<Utc>,

    /// Owning system name
    #[serde(default = "default_system")]
    pub system: String,
}

fn default_active() -> bool {
    true
}

fn default_system() -> String {
    INVENTORY_SYSTEM.to_string()
}

impl Component {
    /// Create an active, undamaged component sitting in Inventory
    pub fn new(id: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            name: String::new(),
            description: description.into(),
            serial_number: String::new(),
            flight_time: 0.0,
            location: String::new(),
            history: String::new(),
            damaged: false,
            active: true,
            start_date: Utc::now(),
            system: default_system(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = serial.into();
        self
    }

    pub fn with_flight_time(mut self, minutes: f64) -> Self {
        self.flight_time = minutes;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Whether the part sits in the Inventory pool
    pub fn in_inventory(&self) -> bool {
        self.system == INVENTORY_SYSTEM
    }

    /// Validate field values before they reach the store
    pub fn validate(&self) -> Result<(), String> {
        if !self.flight_time.is_finite() {
            return Err("flight time must be a finite number of minutes".to_string());
        }
        if self.flight_time < 0.0 {
            return Err(format!(
                "flight time cannot be negative (got {})",
                self.flight_time
            ));
        }
        Ok(())
    }

    /// Flight time rendered as hours and minutes
    pub fn flight_time_display(&self) -> String {
        format_minutes(self.flight_time)
    }
}

/// Format a duration in minutes as "Hh MMm"
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.round() as i64;
    format!("{}h {:02}m", total / 60, total % 60)
}
