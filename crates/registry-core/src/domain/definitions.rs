//! # Definition Registry
//!
//! Definitions are named state vocabularies. They reference nothing, so they
//! are validated first and become the resolution root for Groups and
//! Reactive Entities.
//!
//! ## Validation Rules
//!
//! | Rule | Error |
//! |------|-------|
//! | Names unique across the batch | `DuplicateName` |
//! | At least one state | `EmptyStates` |
//! | State hex codes unique within a definition | `DuplicateStateHex` |
//! | State hex codes parse as 16-bit literals | `MalformedHex` |
//!
//! The first violation rejects the whole batch.

use crate::domain::errors::{RecordKind, RegistryError};
use crate::domain::hex::{format_hex, parse_hex};
use crate::domain::value_objects::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A state as written in documents: hex literal plus label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(rename = "Hex")]
    pub hex: String,
    #[serde(rename = "Label")]
    pub label: String,
}

/// A definition in human form, as loaded from `definitions.json` or served
/// by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefinitionDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub states: Vec<StateDocument>,
}

/// A state in storage form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub hex: u16,
    pub label: String,
}

/// A validated definition awaiting its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDefinition {
    pub name: String,
    pub description: Option<String>,
    pub states: Vec<State>,
}

/// A persisted definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub states: Vec<State>,
}

impl NewDefinition {
    /// Attach the identifier assigned by the store.
    pub fn with_id(self, id: RecordId) -> Definition {
        Definition {
            id,
            name: self.name,
            description: self.description,
            states: self.states,
        }
    }
}

impl Definition {
    /// Look up a state by its index in the ordered state list.
    pub fn state_at(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }
}

/// Validate a batch of definition documents.
pub fn validate_definitions(
    documents: &[DefinitionDocument],
) -> Result<Vec<NewDefinition>, RegistryError> {
    let mut names: HashSet<&str> = HashSet::with_capacity(documents.len());

    documents
        .iter()
        .map(|document| {
            if !names.insert(document.name.as_str()) {
                return Err(RegistryError::DuplicateName {
                    kind: RecordKind::Definition,
                    name: document.name.clone(),
                });
            }
            validate_definition(document)
        })
        .collect()
}

fn validate_definition(document: &DefinitionDocument) -> Result<NewDefinition, RegistryError> {
    if document.states.is_empty() {
        return Err(RegistryError::EmptyStates {
            definition: document.name.clone(),
        });
    }

    let mut seen: HashSet<u16> = HashSet::with_capacity(document.states.len());
    let mut states = Vec::with_capacity(document.states.len());

    for state in &document.states {
        let hex = parse_hex(&state.hex)?;
        if !seen.insert(hex) {
            return Err(RegistryError::DuplicateStateHex {
                definition: document.name.clone(),
                hex: format_hex(hex),
            });
        }
        states.push(State {
            hex,
            label: state.label.clone(),
        });
    }

    Ok(NewDefinition {
        name: document.name.clone(),
        description: document.description.clone(),
        states,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(hex: &str, label: &str) -> StateDocument {
        StateDocument {
            hex: hex.into(),
            label: label.into(),
        }
    }

    fn definition(name: &str, states: Vec<StateDocument>) -> DefinitionDocument {
        DefinitionDocument {
            name: name.into(),
            description: None,
            states,
        }
    }

    #[test]
    fn test_valid_batch_converts_hex() {
        let docs = vec![
            definition("Lamp", vec![state("0x00", "off"), state("0x01", "on")]),
            definition("Door", vec![state("0x10", "closed")]),
        ];

        let validated = validate_definitions(&docs).unwrap();
        assert_eq!(validated.len(), 2);
        assert_eq!(validated[0].states[1].hex, 1);
        assert_eq!(validated[0].states[1].label, "on");
        assert_eq!(validated[1].states[0].hex, 0x10);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let docs = vec![
            definition("A", vec![state("0x01", "x")]),
            definition("A", vec![state("0x02", "y")]),
        ];

        let err = validate_definitions(&docs).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                kind: RecordKind::Definition,
                name: "A".into()
            }
        );
    }

    #[test]
    fn test_rejects_empty_states() {
        let docs = vec![definition("Empty", vec![])];
        assert!(matches!(
            validate_definitions(&docs),
            Err(RegistryError::EmptyStates { definition }) if definition == "Empty"
        ));
    }

    #[test]
    fn test_rejects_duplicate_state_hex() {
        let docs = vec![definition("A", vec![state("0x01", "x"), state("0x01", "y")])];
        assert_eq!(
            validate_definitions(&docs).unwrap_err(),
            RegistryError::DuplicateStateHex {
                definition: "A".into(),
                hex: "0x01".into()
            }
        );
    }

    #[test]
    fn test_duplicate_state_hex_compared_numerically() {
        let docs = vec![definition("A", vec![state("0x1", "x"), state("0x01", "y")])];
        assert!(matches!(
            validate_definitions(&docs),
            Err(RegistryError::DuplicateStateHex { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_state_hex() {
        let docs = vec![definition("A", vec![state("0xnope", "x")])];
        assert!(matches!(
            validate_definitions(&docs),
            Err(RegistryError::MalformedHex { .. })
        ));
    }

    #[test]
    fn test_first_violation_aborts_batch() {
        let docs = vec![
            definition("Good", vec![state("0x01", "x")]),
            definition("Bad", vec![]),
            definition("Good", vec![state("0x01", "x")]),
        ];
        assert!(matches!(
            validate_definitions(&docs),
            Err(RegistryError::EmptyStates { .. })
        ));
    }

    #[test]
    fn test_document_wire_format() {
        let json = r#"[{"Name":"Lamp","States":[{"Hex":"0x00","Label":"off"}]}]"#;
        let docs: Vec<DefinitionDocument> = serde_json::from_str(json).unwrap();
        assert_eq!(docs[0].name, "Lamp");
        assert_eq!(docs[0].description, None);
        assert_eq!(docs[0].states[0].label, "off");
    }
}
