//! System entity type - Airframes that own components

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::component::Component;

/// Airframe category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WingType {
    #[default]
    Unspecified,
    FixedWing,
    Quad,
    Octo,
    None,
}

impl WingType {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            WingType::Unspecified => "Unspecified",
            WingType::FixedWing => "FixedWing",
            WingType::Quad => "Quad",
            WingType::Octo => "Octo",
            WingType::None => "None",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            WingType::Unspecified => "Unspecified",
            WingType::FixedWing => "Fixed Wing",
            WingType::Quad => "Quadcopter",
            WingType::Octo => "Octocopter",
            WingType::None => "None",
        }
    }

    /// All wing types in declaration order
    pub fn all() -> &'static [WingType] {
        &[
            WingType::Unspecified,
            WingType::FixedWing,
            WingType::Quad,
            WingType::Octo,
            WingType::None,
        ]
    }

    /// Lenient parse used for legacy files: anything unknown is Unspecified
    pub fn from_legacy(s: &str) -> Self {
        s.trim().parse().unwrap_or_default()
    }
}

impl std::fmt::Display for WingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Unrecognized wing type string
#[derive(Debug, Clone, Error)]
#[error("Invalid wing type: '{0}'. Use unspecified, fixed-wing, quad, octo, or none")]
pub struct ParseWingTypeError(pub String);

impl std::str::FromStr for WingType {
    type Err = ParseWingTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "unspecified" => Ok(WingType::Unspecified),
            "fixedwing" => Ok(WingType::FixedWing),
            "quad" | "quadcopter" => Ok(WingType::Quad),
            "octo" | "octocopter" => Ok(WingType::Octo),
            "none" => Ok(WingType::None),
            _ => Err(ParseWingTypeError(s.to_string())),
        }
    }
}

/// A named airframe and the components attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfslSystem {
    /// Unique system name
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Airframe category
    #[serde(default)]
    pub wing_type: WingType,

    /// When the system entered the equipage
    pub start_date: DateTime<Utc>,

    /// Attached components, ordered by id
    #[serde(default)]
    pub components: Vec<Component>,
}

impl AfslSystem {
    /// Create a new system with no components
    pub fn new(name: impl Into<String>, description: impl Into<String>, wing_type: WingType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            wing_type,
            start_date: Utc::now(),
            components: Vec::new(),
        }
    }

    /// Builder-style component attachment
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Find an attached component by id
    pub fn component(&self, id: i64) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Total flight time logged by all attached components
    pub fn total_flight_time(&self) -> f64 {
        self.components.iter().map(|c| c.flight_time).sum()
    }
}
