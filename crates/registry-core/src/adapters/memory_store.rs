//! # In-Memory Record Store
//!
//! [`RecordStore`] adapter holding each collection behind its own
//! `parking_lot::RwLock`. Insertion order is preserved, so listings come
//! back in the order records were written.

use crate::domain::{
    Definition, DeleteOutcome, EntityData, Group, InsertOutcome, NewDefinition, NewGroup,
    NewReactiveEntity, ReactiveEntity, RecordId, StoreError,
};
use crate::ports::RecordStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

/// In-memory implementation of [`RecordStore`].
pub struct InMemoryRecordStore {
    definitions: RwLock<Vec<Definition>>,
    groups: RwLock<Vec<Group>>,
    entities: RwLock<Vec<ReactiveEntity>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            definitions: RwLock::new(Vec::new()),
            groups: RwLock::new(Vec::new()),
            entities: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored entities.
    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn replace_definitions(
        &self,
        definitions: Vec<NewDefinition>,
    ) -> Result<Vec<Definition>, StoreError> {
        let stored: Vec<Definition> = definitions
            .into_iter()
            .map(|d| d.with_id(RecordId::generate()))
            .collect();
        let mut collection = self.definitions.write();
        debug!(dropped = collection.len(), inserted = stored.len(), "Replacing definitions");
        *collection = stored.clone();
        Ok(stored)
    }

    async fn find_definitions(&self) -> Result<Vec<Definition>, StoreError> {
        Ok(self.definitions.read().clone())
    }

    async fn find_definition_by_id(
        &self,
        id: &RecordId,
    ) -> Result<Option<Definition>, StoreError> {
        Ok(self.definitions.read().iter().find(|d| d.id == *id).cloned())
    }

    async fn find_definition_by_name(&self, name: &str) -> Result<Option<Definition>, StoreError> {
        Ok(self
            .definitions
            .read()
            .iter()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn replace_groups(&self, groups: Vec<NewGroup>) -> Result<Vec<Group>, StoreError> {
        let stored: Vec<Group> = groups
            .into_iter()
            .map(|g| g.with_id(RecordId::generate()))
            .collect();
        let mut collection = self.groups.write();
        debug!(dropped = collection.len(), inserted = stored.len(), "Replacing groups");
        *collection = stored.clone();
        Ok(stored)
    }

    async fn find_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.groups.read().clone())
    }

    async fn find_group_by_id(&self, id: &RecordId) -> Result<Option<Group>, StoreError> {
        Ok(self.groups.read().iter().find(|g| g.id == *id).cloned())
    }

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError> {
        Ok(self.groups.read().iter().find(|g| g.name == name).cloned())
    }

    async fn find_groups_by_names(&self, names: &[String]) -> Result<Vec<Group>, StoreError> {
        Ok(self
            .groups
            .read()
            .iter()
            .filter(|g| names.contains(&g.name))
            .cloned()
            .collect())
    }

    async fn insert_entity_if_absent(
        &self,
        entity: NewReactiveEntity,
    ) -> Result<InsertOutcome, StoreError> {
        let mut entities = self.entities.write();
        if entities.iter().any(|e| e.entity_hex == entity.entity_hex) {
            return Ok(InsertOutcome::Duplicate);
        }
        let stored = entity.with_id(RecordId::generate());
        entities.push(stored.clone());
        Ok(InsertOutcome::Inserted(stored))
    }

    async fn find_entities(&self) -> Result<Vec<ReactiveEntity>, StoreError> {
        Ok(self.entities.read().clone())
    }

    async fn find_entity_by_id(
        &self,
        id: &RecordId,
    ) -> Result<Option<ReactiveEntity>, StoreError> {
        Ok(self.entities.read().iter().find(|e| e.id == *id).cloned())
    }

    async fn find_entity_by_hex(
        &self,
        entity_hex: u16,
    ) -> Result<Option<ReactiveEntity>, StoreError> {
        Ok(self
            .entities
            .read()
            .iter()
            .find(|e| e.entity_hex == entity_hex)
            .cloned())
    }

    async fn find_entities_with_all_groups(
        &self,
        group_ids: &[RecordId],
    ) -> Result<Vec<ReactiveEntity>, StoreError> {
        Ok(self
            .entities
            .read()
            .iter()
            .filter(|e| e.has_all_groups(group_ids))
            .cloned()
            .collect())
    }

    async fn update_entity_data(
        &self,
        entity_hex: u16,
        data: EntityData,
    ) -> Result<Option<ReactiveEntity>, StoreError> {
        let mut entities = self.entities.write();
        Ok(entities
            .iter_mut()
            .find(|e| e.entity_hex == entity_hex)
            .map(|entity| {
                entity.data = data;
                entity.clone()
            }))
    }

    async fn delete_entity_by_hex(&self, entity_hex: u16) -> Result<DeleteOutcome, StoreError> {
        let mut entities = self.entities.write();
        match entities.iter().position(|e| e.entity_hex == entity_hex) {
            Some(index) => {
                entities.remove(index);
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn drop_entities(&self) -> Result<u64, StoreError> {
        let mut entities = self.entities.write();
        let dropped = entities.len() as u64;
        entities.clear();
        Ok(dropped)
    }
}
