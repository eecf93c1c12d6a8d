//! # Conversion Layer
//!
//! Maps records between human form (names, hex strings) and storage form
//! (record identifiers, numeric hex).
//!
//! Every conversion takes a [`ResolutionContext`] built from the record sets
//! current at call time. Nothing is cached between calls, so a rename or
//! delete is visible to the next conversion.
//!
//! Conversions here are lenient: a reference that does not resolve is logged
//! at `warn` and degrades to a blank name (storage to human) or an omitted
//! identifier (human to storage). Request paths that must fail fast check
//! references before converting.

use crate::domain::definitions::{Definition, DefinitionDocument, StateDocument};
use crate::domain::entities::{EntityDocument, NewReactiveEntity, ReactiveEntity};
use crate::domain::errors::RegistryError;
use crate::domain::groups::{Group, GroupDocument, NewGroup};
use crate::domain::hex::{format_hex, parse_hex};
use crate::domain::value_objects::RecordId;
use std::collections::HashMap;
use tracing::warn;

/// Name and identifier lookups over one snapshot of definitions and groups.
#[derive(Debug, Default)]
pub struct ResolutionContext<'a> {
    definition_ids: HashMap<&'a str, RecordId>,
    definition_names: HashMap<RecordId, &'a str>,
    group_ids: HashMap<&'a str, RecordId>,
    group_names: HashMap<RecordId, &'a str>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(definitions: &'a [Definition], groups: &'a [Group]) -> Self {
        Self {
            definition_ids: definitions
                .iter()
                .map(|d| (d.name.as_str(), d.id))
                .collect(),
            definition_names: definitions
                .iter()
                .map(|d| (d.id, d.name.as_str()))
                .collect(),
            group_ids: groups.iter().map(|g| (g.name.as_str(), g.id)).collect(),
            group_names: groups.iter().map(|g| (g.id, g.name.as_str())).collect(),
        }
    }

    pub fn definition_id(&self, name: &str) -> Option<RecordId> {
        self.definition_ids.get(name).copied()
    }

    pub fn definition_name(&self, id: &RecordId) -> Option<&'a str> {
        self.definition_names.get(id).copied()
    }

    pub fn group_id(&self, name: &str) -> Option<RecordId> {
        self.group_ids.get(name).copied()
    }

    pub fn group_name(&self, id: &RecordId) -> Option<&'a str> {
        self.group_names.get(id).copied()
    }

    fn definition_name_or_blank(&self, id: &RecordId, owner: &str) -> String {
        match self.definition_name(id) {
            Some(name) => name.to_string(),
            None => {
                warn!(owner, definition_id = %id, "Dangling definition reference");
                String::new()
            }
        }
    }

    fn group_name_or_blank(&self, id: &RecordId, owner: &str) -> String {
        match self.group_name(id) {
            Some(name) => name.to_string(),
            None => {
                warn!(owner, group_id = %id, "Dangling group reference");
                String::new()
            }
        }
    }
}

/// Render a stored definition in human form.
pub fn definition_to_document(definition: &Definition) -> DefinitionDocument {
    DefinitionDocument {
        name: definition.name.clone(),
        description: definition.description.clone(),
        states: definition
            .states
            .iter()
            .map(|state| StateDocument {
                hex: format_hex(state.hex),
                label: state.label.clone(),
            })
            .collect(),
    }
}

/// Render a stored group in human form. Dangling definition identifiers
/// become blank names.
pub fn group_to_document(group: &Group, context: &ResolutionContext<'_>) -> GroupDocument {
    GroupDocument {
        name: group.name.clone(),
        description: group.description.clone(),
        allowed_definitions: group
            .allowed_definitions
            .iter()
            .map(|id| context.definition_name_or_blank(id, &group.name))
            .collect(),
    }
}

/// Resolve a group document into storage form, dropping unknown names.
///
/// See [`validate_groups`](crate::domain::groups::validate_groups) for the
/// strict variant used when loading.
pub fn group_to_storage(document: &GroupDocument, context: &ResolutionContext<'_>) -> NewGroup {
    let allowed_definitions = document
        .allowed_definitions
        .iter()
        .filter_map(|name| {
            let id = context.definition_id(name);
            if id.is_none() {
                warn!(group = %document.name, definition = %name, "Unresolved definition name, omitted");
            }
            id
        })
        .collect();

    NewGroup {
        name: document.name.clone(),
        description: document.description.clone(),
        allowed_definitions,
    }
}

/// Convert an entity document into storage form.
///
/// Fails only on a malformed `EntityHex`. An unresolved definition leaves
/// `definition` empty and unresolved groups are omitted. Repeated groups are
/// kept once, in first-seen order.
pub fn entity_to_storage(
    document: &EntityDocument,
    context: &ResolutionContext<'_>,
) -> Result<NewReactiveEntity, RegistryError> {
    let entity_hex = parse_hex(&document.entity_hex)?;

    let definition = context.definition_id(&document.definition);
    if definition.is_none() {
        warn!(
            entity_hex = %format_hex(entity_hex),
            definition = %document.definition,
            "Unresolved definition name, omitted"
        );
    }

    let mut groups: Vec<RecordId> = Vec::with_capacity(document.groups.len());
    for name in &document.groups {
        match context.group_id(name) {
            Some(id) if !groups.contains(&id) => groups.push(id),
            Some(_) => {}
            None => warn!(
                entity_hex = %format_hex(entity_hex),
                group = %name,
                "Unresolved group name, omitted"
            ),
        }
    }

    Ok(NewReactiveEntity {
        entity_hex,
        description: document.description.clone(),
        location: document.location.clone(),
        definition,
        groups,
        data: document.data.clone(),
    })
}

/// Render a stored entity in human form, including its identifier.
pub fn entity_to_document(
    entity: &ReactiveEntity,
    context: &ResolutionContext<'_>,
) -> EntityDocument {
    let owner = entity.hex_label();
    EntityDocument {
        id: Some(entity.id),
        entity_hex: owner.clone(),
        description: entity.description.clone(),
        location: entity.location.clone(),
        definition: entity
            .definition
            .as_ref()
            .map(|id| context.definition_name_or_blank(id, &owner))
            .unwrap_or_default(),
        groups: entity
            .groups
            .iter()
            .map(|id| context.group_name_or_blank(id, &owner))
            .collect(),
        data: entity.data.clone(),
    }
}
