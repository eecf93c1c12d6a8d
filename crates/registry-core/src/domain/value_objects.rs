//! # Value Objects
//!
//! Small immutable types shared by every record kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Default deadline for a single record store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Surrogate identifier assigned by the record store on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical placement of a reactive entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "SLCoordX", default)]
    pub coord_x: f64,
    #[serde(rename = "SLCoordY", default)]
    pub coord_y: f64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Rack", default)]
    pub rack: i32,
}

/// Live state carried by a reactive entity.
///
/// `current_state` indexes into the referenced definition's state list.
/// A freshly created entity carries the zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityData {
    #[serde(rename = "CurrentState", default)]
    pub current_state: usize,
    #[serde(rename = "LastUpdated", default)]
    pub last_updated: DateTime<Utc>,
}

/// Registry service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Deadline applied to every record store call.
    pub store_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_parse_display() {
        let id = RecordId::generate();
        let parsed: RecordId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_entity_data_zero_value() {
        let data = EntityData::default();
        assert_eq!(data.current_state, 0);
        assert_eq!(data.last_updated.timestamp(), 0);
    }

    #[test]
    fn test_location_wire_names() {
        let location = Location {
            coord_x: 1.5,
            coord_y: -2.0,
            name: "Hall A".into(),
            rack: 3,
        };
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["SLCoordX"], 1.5);
        assert_eq!(json["SLCoordY"], -2.0);
        assert_eq!(json["Name"], "Hall A");
        assert_eq!(json["Rack"], 3);
    }
}
