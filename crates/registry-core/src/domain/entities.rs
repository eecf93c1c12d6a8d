//! # Reactive Entities
//!
//! Addressable runtime records keyed by a 16-bit hex address. Unlike
//! definitions and groups they are created one at a time through the API,
//! never bulk loaded.

use crate::domain::hex::format_hex;
use crate::domain::value_objects::{EntityData, Location, RecordId};
use serde::{Deserialize, Serialize};

/// A reactive entity in human form, as accepted and served by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityDocument {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub entity_hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub data: EntityData,
}

/// A reactive entity in storage form, awaiting its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReactiveEntity {
    pub entity_hex: u16,
    pub description: Option<String>,
    pub location: Location,
    /// `None` only when lenient conversion could not resolve the name.
    pub definition: Option<RecordId>,
    pub groups: Vec<RecordId>,
    pub data: EntityData,
}

/// A persisted reactive entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactiveEntity {
    pub id: RecordId,
    pub entity_hex: u16,
    pub description: Option<String>,
    pub location: Location,
    pub definition: Option<RecordId>,
    pub groups: Vec<RecordId>,
    pub data: EntityData,
}

impl NewReactiveEntity {
    /// Attach the identifier assigned by the store.
    pub fn with_id(self, id: RecordId) -> ReactiveEntity {
        ReactiveEntity {
            id,
            entity_hex: self.entity_hex,
            description: self.description,
            location: self.location,
            definition: self.definition,
            groups: self.groups,
            data: self.data,
        }
    }
}

impl ReactiveEntity {
    /// Address rendered as a canonical hex literal.
    pub fn hex_label(&self) -> String {
        format_hex(self.entity_hex)
    }

    /// Whether the entity is tagged with every group in `required`.
    pub fn has_all_groups(&self, required: &[RecordId]) -> bool {
        required.iter().all(|group| self.groups.contains(group))
    }
}

/// Result of a conditional insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(ReactiveEntity),
    /// Another entity already holds the address.
    Duplicate,
}

/// Result of a delete by address. A miss is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    /// Number of records affected.
    pub fn affected(&self) -> u64 {
        match self {
            Self::Deleted => 1,
            Self::NotFound => 0,
        }
    }
}
