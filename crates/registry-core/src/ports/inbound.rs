//! # Inbound Ports (Driving Ports)
//!
//! Public operations of the registry. All inputs and outputs are in human
//! form; identifiers never leak as anything but the entity `ID`.

use crate::domain::{
    DefinitionDocument, DeleteOutcome, EntityDocument, GroupDocument, RecordId, RegistryError,
};
use async_trait::async_trait;

/// Primary API for the registry.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// List every definition.
    async fn list_definitions(&self) -> Result<Vec<DefinitionDocument>, RegistryError>;

    /// Get a definition by name.
    ///
    /// ## Returns
    ///
    /// - `Err(NotFound)`: no definition carries that name
    async fn get_definition(&self, name: &str) -> Result<DefinitionDocument, RegistryError>;

    /// List every group.
    async fn list_groups(&self) -> Result<Vec<GroupDocument>, RegistryError>;

    /// Get a group by name.
    async fn get_group(&self, name: &str) -> Result<GroupDocument, RegistryError>;

    /// List every reactive entity.
    async fn list_entities(&self) -> Result<Vec<EntityDocument>, RegistryError>;

    /// Get a reactive entity by record identifier.
    async fn get_entity(&self, id: RecordId) -> Result<EntityDocument, RegistryError>;

    /// Get a reactive entity by address.
    async fn get_entity_by_hex(&self, entity_hex: u16) -> Result<EntityDocument, RegistryError>;

    /// Entities tagged with every one of `group_names`.
    ///
    /// ## Returns
    ///
    /// - `Ok(vec![])`: a name is unknown or nothing matches
    /// - `Err(MissingField)`: no names were supplied
    async fn get_entities_by_groups(
        &self,
        group_names: &[String],
    ) -> Result<Vec<EntityDocument>, RegistryError>;

    /// Create a reactive entity.
    ///
    /// ## Returns
    ///
    /// - `Ok(EntityDocument)`: the stored entity, including its `ID`
    /// - `Err(MissingField)`: `EntityHex` or `Definition` is blank
    /// - `Err(MalformedHex)`: `EntityHex` does not parse
    /// - `Err(Conflict)`: the address is already taken
    /// - `Err(UnresolvedReference)`: unknown definition or group
    async fn create_entity(&self, document: EntityDocument)
        -> Result<EntityDocument, RegistryError>;

    /// Delete the reactive entity at `entity_hex`. A miss is reported as
    /// [`DeleteOutcome::NotFound`], not as an error.
    async fn delete_entity(&self, entity_hex: u16) -> Result<DeleteOutcome, RegistryError>;

    /// Move an entity to the state at `current_state` in its definition.
    ///
    /// ## Returns
    ///
    /// - `Err(NotFound)`: no entity at `entity_hex`
    /// - `Err(UnresolvedReference)`: the entity's definition no longer exists
    /// - `Err(StateOutOfRange)`: the index exceeds the definition's states
    async fn transition_entity(
        &self,
        entity_hex: u16,
        current_state: usize,
    ) -> Result<EntityDocument, RegistryError>;
}
