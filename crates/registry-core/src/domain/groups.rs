//! # Group Registry
//!
//! Groups tag reactive entities and restrict them to a subset of
//! definitions. A group references definitions only; groups never reference
//! other groups, so no cycle detection is needed.
//!
//! Load-time validation is strict: any unresolved definition name rejects
//! the batch. Reading a stored group back (see
//! [`conversion::group_to_document`](crate::domain::conversion::group_to_document))
//! is lenient instead.

use crate::domain::conversion::ResolutionContext;
use crate::domain::definitions::Definition;
use crate::domain::errors::{RecordKind, RegistryError};
use crate::domain::value_objects::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A group in human form: definition references are names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub allowed_definitions: Vec<String>,
}

/// A validated group awaiting its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub allowed_definitions: Vec<RecordId>,
}

/// A persisted group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub allowed_definitions: Vec<RecordId>,
}

impl NewGroup {
    /// Attach the identifier assigned by the store.
    pub fn with_id(self, id: RecordId) -> Group {
        Group {
            id,
            name: self.name,
            description: self.description,
            allowed_definitions: self.allowed_definitions,
        }
    }
}

/// Validate a batch of group documents against the persisted definitions.
pub fn validate_groups(
    documents: &[GroupDocument],
    definitions: &[Definition],
) -> Result<Vec<NewGroup>, RegistryError> {
    let context = ResolutionContext::new(definitions, &[]);
    let mut names: HashSet<&str> = HashSet::with_capacity(documents.len());
    let mut validated = Vec::with_capacity(documents.len());

    for document in documents {
        if !names.insert(document.name.as_str()) {
            return Err(RegistryError::DuplicateName {
                kind: RecordKind::Group,
                name: document.name.clone(),
            });
        }

        let allowed_definitions = document
            .allowed_definitions
            .iter()
            .map(|name| {
                context
                    .definition_id(name)
                    .ok_or_else(|| RegistryError::UnresolvedReference {
                        owner: document.name.clone(),
                        kind: RecordKind::Definition,
                        name: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        validated.push(NewGroup {
            name: document.name.clone(),
            description: document.description.clone(),
            allowed_definitions,
        });
    }

    Ok(validated)
}
