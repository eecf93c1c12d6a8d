//! # Outbound Ports (Driven Ports)
//!
//! SPIs required by the registry: a record store, a clock and an event sink.

use crate::domain::{
    Definition, DeleteOutcome, EntityData, Group, InsertOutcome, NewDefinition, NewGroup,
    NewReactiveEntity, ReactiveEntity, RecordId, StoreError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Keyed collections of definitions, groups and reactive entities.
///
/// The store assigns [`RecordId`]s on insertion. Callers bound every call
/// with a deadline; implementations need not time out on their own.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Drop all definitions, then insert `definitions` with fresh identifiers.
    async fn replace_definitions(
        &self,
        definitions: Vec<NewDefinition>,
    ) -> Result<Vec<Definition>, StoreError>;

    async fn find_definitions(&self) -> Result<Vec<Definition>, StoreError>;

    async fn find_definition_by_id(&self, id: &RecordId)
        -> Result<Option<Definition>, StoreError>;

    async fn find_definition_by_name(&self, name: &str) -> Result<Option<Definition>, StoreError>;

    /// Drop all groups, then insert `groups` with fresh identifiers.
    async fn replace_groups(&self, groups: Vec<NewGroup>) -> Result<Vec<Group>, StoreError>;

    async fn find_groups(&self) -> Result<Vec<Group>, StoreError>;

    async fn find_group_by_id(&self, id: &RecordId) -> Result<Option<Group>, StoreError>;

    async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>, StoreError>;

    /// Groups whose name is any of `names`.
    async fn find_groups_by_names(&self, names: &[String]) -> Result<Vec<Group>, StoreError>;

    /// Insert unless an entity already holds the same `entity_hex`. The check
    /// and the insert are one atomic operation.
    async fn insert_entity_if_absent(
        &self,
        entity: NewReactiveEntity,
    ) -> Result<InsertOutcome, StoreError>;

    async fn find_entities(&self) -> Result<Vec<ReactiveEntity>, StoreError>;

    async fn find_entity_by_id(&self, id: &RecordId)
        -> Result<Option<ReactiveEntity>, StoreError>;

    async fn find_entity_by_hex(&self, entity_hex: u16)
        -> Result<Option<ReactiveEntity>, StoreError>;

    /// Entities whose groups contain all of `group_ids`.
    async fn find_entities_with_all_groups(
        &self,
        group_ids: &[RecordId],
    ) -> Result<Vec<ReactiveEntity>, StoreError>;

    /// Replace the live data of the entity at `entity_hex`, returning the
    /// updated record or `None` if no entity matched.
    async fn update_entity_data(
        &self,
        entity_hex: u16,
        data: EntityData,
    ) -> Result<Option<ReactiveEntity>, StoreError>;

    async fn delete_entity_by_hex(&self, entity_hex: u16) -> Result<DeleteOutcome, StoreError>;

    /// Remove every entity, returning how many were dropped.
    async fn drop_entities(&self) -> Result<u64, StoreError>;
}

/// Wall clock used to stamp state transitions.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`TimeSource`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A change to the registry, emitted after it has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegistryChange {
    /// Definitions and groups were replaced by a bulk load.
    CatalogLoaded { definitions: usize, groups: usize },

    EntityCreated(ReactiveEntity),

    EntityDeleted { entity_hex: u16 },

    EntityTransitioned {
        entity: ReactiveEntity,
        previous_state: usize,
    },
}

/// Destination for [`RegistryChange`] notifications.
///
/// Publication is fire-and-forget: a sink must never fail the operation that
/// produced the change.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish_change(&self, change: RegistryChange);
}

/// [`EventSink`] that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn publish_change(&self, _change: RegistryChange) {}
}

#[async_trait]
impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    async fn publish_change(&self, change: RegistryChange) {
        (**self).publish_change(change).await
    }
}
