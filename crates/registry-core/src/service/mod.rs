//! # Registry Service
//!
//! Implements [`RegistryApi`] on top of the outbound ports.
//!
//! ## Request Handling
//!
//! - Every store call runs under the configured deadline; an expired
//!   deadline or a store failure becomes `StoreUnavailable`.
//! - Name resolution always reads the current definition and group sets.
//! - Creation rejects a taken address before it checks references, then
//!   relies on the store's conditional insert for address uniqueness.
//! - Every fallible read a mutation needs happens before the write.
//! - Changes are published after they are stored. Publication cannot fail
//!   a request.


use crate::domain::{
    definition_to_document, entity_to_document, entity_to_storage, format_hex, group_to_document,
    parse_hex, Definition, DefinitionDocument, DeleteOutcome, EntityData, EntityDocument, Group,
    GroupDocument, InsertOutcome, RecordId, RecordKind, RegistryConfig, RegistryError,
    ResolutionContext, StoreError,
};
use crate::loader::{self, CatalogDocuments, CatalogSummary};
use crate::ports::{EventSink, RecordStore, RegistryApi, RegistryChange, TimeSource};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Run a store call under `deadline`.
pub(crate) async fn with_deadline<T, F>(
    operation: &'static str,
    deadline: Duration,
    call: F,
) -> Result<T, RegistryError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(RegistryError::StoreUnavailable {
            operation: operation.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(RegistryError::StoreUnavailable {
            operation: operation.to_string(),
            reason: format!("timed out after {}ms", deadline.as_millis()),
        }),
    }
}

/// Dependencies for [`RegistryService`].
pub struct RegistryDependencies<RS, TS, ES> {
    pub store: RS,
    pub time_source: TS,
    pub events: ES,
}

/// The registry service.
pub struct RegistryService<RS, TS, ES>
where
    RS: RecordStore,
    TS: TimeSource,
    ES: EventSink,
{
    store: RS,
    time_source: TS,
    events: ES,
    config: RegistryConfig,
}

impl<RS, TS, ES> RegistryService<RS, TS, ES>
where
    RS: RecordStore,
    TS: TimeSource,
    ES: EventSink,
{
    pub fn new(deps: RegistryDependencies<RS, TS, ES>, config: RegistryConfig) -> Self {
        Self {
            store: deps.store,
            time_source: deps.time_source,
            events: deps.events,
            config,
        }
    }

    /// Replace the stored catalog with `documents`.
    pub async fn load_catalog(
        &self,
        documents: &CatalogDocuments,
    ) -> Result<CatalogSummary, RegistryError> {
        let summary =
            loader::load_catalog(&self.store, documents, self.config.store_timeout).await?;
        self.events
            .publish_change(RegistryChange::CatalogLoaded {
                definitions: summary.definitions,
                groups: summary.groups,
            })
            .await;
        Ok(summary)
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, RegistryError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        with_deadline(operation, self.config.store_timeout, call).await
    }

    async fn definitions(&self) -> Result<Vec<Definition>, RegistryError> {
        self.bounded("find_definitions", self.store.find_definitions())
            .await
    }

    async fn catalog(&self) -> Result<(Vec<Definition>, Vec<Group>), RegistryError> {
        let definitions = self.definitions().await?;
        let groups = self
            .bounded("find_groups", self.store.find_groups())
            .await?;
        Ok((definitions, groups))
    }
}

/// Reject a blank required field.
fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::MissingField { field });
    }
    Ok(trimmed)
}

#[async_trait]
impl<RS, TS, ES> RegistryApi for RegistryService<RS, TS, ES>
where
    RS: RecordStore,
    TS: TimeSource,
    ES: EventSink,
{
    async fn list_definitions(&self) -> Result<Vec<DefinitionDocument>, RegistryError> {
        Ok(self
            .definitions()
            .await?
            .iter()
            .map(definition_to_document)
            .collect())
    }

    async fn get_definition(&self, name: &str) -> Result<DefinitionDocument, RegistryError> {
        self.bounded(
            "find_definition_by_name",
            self.store.find_definition_by_name(name),
        )
        .await?
        .map(|d| definition_to_document(&d))
        .ok_or_else(|| RegistryError::not_found(RecordKind::Definition, name))
    }

    async fn list_groups(&self) -> Result<Vec<GroupDocument>, RegistryError> {
        let (definitions, groups) = self.catalog().await?;
        let context = ResolutionContext::new(&definitions, &groups);
        Ok(groups
            .iter()
            .map(|g| group_to_document(g, &context))
            .collect())
    }

    async fn get_group(&self, name: &str) -> Result<GroupDocument, RegistryError> {
        let group = self
            .bounded("find_group_by_name", self.store.find_group_by_name(name))
            .await?
            .ok_or_else(|| RegistryError::not_found(RecordKind::Group, name))?;
        let definitions = self.definitions().await?;
        let context = ResolutionContext::new(&definitions, &[]);
        Ok(group_to_document(&group, &context))
    }

    async fn list_entities(&self) -> Result<Vec<EntityDocument>, RegistryError> {
        let entities = self
            .bounded("find_entities", self.store.find_entities())
            .await?;
        let (definitions, groups) = self.catalog().await?;
        let context = ResolutionContext::new(&definitions, &groups);
        Ok(entities
            .iter()
            .map(|e| entity_to_document(e, &context))
            .collect())
    }

    async fn get_entity(&self, id: RecordId) -> Result<EntityDocument, RegistryError> {
        let entity = self
            .bounded("find_entity_by_id", self.store.find_entity_by_id(&id))
            .await?
            .ok_or_else(|| RegistryError::not_found(RecordKind::ReactiveEntity, id.to_string()))?;
        let (definitions, groups) = self.catalog().await?;
        Ok(entity_to_document(
            &entity,
            &ResolutionContext::new(&definitions, &groups),
        ))
    }

    async fn get_entity_by_hex(&self, entity_hex: u16) -> Result<EntityDocument, RegistryError> {
        let entity = self
            .bounded("find_entity_by_hex", self.store.find_entity_by_hex(entity_hex))
            .await?
            .ok_or_else(|| {
                RegistryError::not_found(RecordKind::ReactiveEntity, format_hex(entity_hex))
            })?;
        let (definitions, groups) = self.catalog().await?;
        Ok(entity_to_document(
            &entity,
            &ResolutionContext::new(&definitions, &groups),
        ))
    }

    async fn get_entities_by_groups(
        &self,
        group_names: &[String],
    ) -> Result<Vec<EntityDocument>, RegistryError> {
        let requested: BTreeSet<String> = group_names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        if requested.is_empty() {
            return Err(RegistryError::MissingField { field: "Groups" });
        }

        let names: Vec<String> = requested.into_iter().collect();
        let matched = self
            .bounded(
                "find_groups_by_names",
                self.store.find_groups_by_names(&names),
            )
            .await?;
        if matched.len() < names.len() {
            let unknown: Vec<&String> = names
                .iter()
                .filter(|name| !matched.iter().any(|g| &g.name == *name))
                .collect();
            warn!(?unknown, "Group lookup names unknown groups, no entity can match");
            return Ok(Vec::new());
        }

        let group_ids: Vec<RecordId> = matched.iter().map(|g| g.id).collect();
        let entities = self
            .bounded(
                "find_entities_with_all_groups",
                self.store.find_entities_with_all_groups(&group_ids),
            )
            .await?;
        let (definitions, groups) = self.catalog().await?;
        let context = ResolutionContext::new(&definitions, &groups);
        Ok(entities
            .iter()
            .map(|e| entity_to_document(e, &context))
            .collect())
    }

    async fn create_entity(
        &self,
        document: EntityDocument,
    ) -> Result<EntityDocument, RegistryError> {
        let hex_literal = require(&document.entity_hex, "EntityHex")?.to_string();
        let definition_name = require(&document.definition, "Definition")?.to_string();
        let entity_hex = parse_hex(&hex_literal)?;
        let owner = format_hex(entity_hex);

        // Checked again atomically on insert.
        if self
            .bounded("find_entity_by_hex", self.store.find_entity_by_hex(entity_hex))
            .await?
            .is_some()
        {
            return Err(RegistryError::Conflict { entity_hex: owner });
        }

        let (definitions, groups) = self.catalog().await?;
        let context = ResolutionContext::new(&definitions, &groups);

        let mut group_names: Vec<String> = Vec::with_capacity(document.groups.len());
        for name in document.groups.iter().map(|name| name.trim()) {
            if !group_names.iter().any(|seen| seen == name) {
                group_names.push(name.to_string());
            }
        }

        if context.definition_id(&definition_name).is_none() {
            return Err(RegistryError::UnresolvedReference {
                owner,
                kind: RecordKind::Definition,
                name: definition_name,
            });
        }
        if let Some(missing) = group_names
            .iter()
            .find(|name| context.group_id(name).is_none())
        {
            return Err(RegistryError::UnresolvedReference {
                owner,
                kind: RecordKind::Group,
                name: missing.clone(),
            });
        }

        let normalized = EntityDocument {
            id: None,
            entity_hex: hex_literal,
            definition: definition_name,
            groups: group_names,
            data: EntityData::default(),
            ..document
        };
        let new_entity = entity_to_storage(&normalized, &context)?;

        let stored = match self
            .bounded(
                "insert_entity_if_absent",
                self.store.insert_entity_if_absent(new_entity),
            )
            .await?
        {
            InsertOutcome::Inserted(entity) => entity,
            InsertOutcome::Duplicate => {
                return Err(RegistryError::Conflict { entity_hex: owner });
            }
        };

        info!(entity_hex = %owner, id = %stored.id, "Reactive entity created");
        let created = entity_to_document(&stored, &context);
        self.events
            .publish_change(RegistryChange::EntityCreated(stored))
            .await;
        Ok(created)
    }

    async fn delete_entity(&self, entity_hex: u16) -> Result<DeleteOutcome, RegistryError> {
        let outcome = self
            .bounded(
                "delete_entity_by_hex",
                self.store.delete_entity_by_hex(entity_hex),
            )
            .await?;

        if outcome == DeleteOutcome::Deleted {
            info!(entity_hex = %format_hex(entity_hex), "Reactive entity deleted");
            self.events
                .publish_change(RegistryChange::EntityDeleted { entity_hex })
                .await;
        }
        Ok(outcome)
    }

    async fn transition_entity(
        &self,
        entity_hex: u16,
        current_state: usize,
    ) -> Result<EntityDocument, RegistryError> {
        let owner = format_hex(entity_hex);
        let entity = self
            .bounded("find_entity_by_hex", self.store.find_entity_by_hex(entity_hex))
            .await?
            .ok_or_else(|| RegistryError::not_found(RecordKind::ReactiveEntity, owner.clone()))?;

        let definition = match entity.definition {
            Some(id) => {
                self.bounded("find_definition_by_id", self.store.find_definition_by_id(&id))
                    .await?
            }
            None => None,
        }
        .ok_or_else(|| RegistryError::UnresolvedReference {
            owner: owner.clone(),
            kind: RecordKind::Definition,
            name: entity
                .definition
                .map(|id| id.to_string())
                .unwrap_or_default(),
        })?;

        if definition.state_at(current_state).is_none() {
            return Err(RegistryError::StateOutOfRange {
                entity_hex: owner,
                index: current_state,
                states: definition.states.len(),
            });
        }

        let (definitions, groups) = self.catalog().await?;
        let context = ResolutionContext::new(&definitions, &groups);

        let data = EntityData {
            current_state,
            last_updated: self.time_source.now(),
        };
        let updated = self
            .bounded(
                "update_entity_data",
                self.store.update_entity_data(entity_hex, data),
            )
            .await?
            .ok_or_else(|| RegistryError::not_found(RecordKind::ReactiveEntity, owner.clone()))?;

        info!(
            entity_hex = %owner,
            from = entity.data.current_state,
            to = current_state,
            "Reactive entity transitioned"
        );
        let document = entity_to_document(&updated, &context);
        self.events
            .publish_change(RegistryChange::EntityTransitioned {
                entity: updated,
                previous_state: entity.data.current_state,
            })
            .await;
        Ok(document)
    }
}
