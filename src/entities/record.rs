//! Auxiliary component records - general notes and crash history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A free-text note attached to a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Store-assigned id
    pub id: i64,
    pub component: i64,
    pub summary: String,
    #[serde(default)]
    pub description: String,
}

/// A crash involving a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashRecord {
    /// Store-assigned id (0 until persisted)
    #[serde(default)]
    pub id: i64,
    pub component: i64,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    /// When the crash happened
    pub time: DateTime<Utc>,
    /// Where the crash happened
    #[serde(default)]
    pub location: String,
}

impl CrashRecord {
    /// New unsaved crash record stamped with the current time
    pub fn new(component: i64, summary: impl Into<String>) -> Self {
        Self {
            id: 0,
            component,
            summary: summary.into(),
            description: String::new(),
            time: Utc::now(),
            location: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}
