//! # Registry Events
//!
//! Event types that flow through the bus. Each is built from the
//! [`RegistryChange`] the registry service emits after a write.

use chrono::{DateTime, Utc};
use registry_core::{format_hex, ReactiveEntity, RegistryChange};
use serde::{Deserialize, Serialize};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// Definitions and groups were replaced.
    CatalogLoaded { definitions: usize, groups: usize },

    /// A reactive entity was created.
    EntityCreated(ReactiveEntity),

    /// The entity at `entity_hex` was removed.
    EntityDeleted { entity_hex: u16 },

    /// An entity moved to another state of its definition.
    EntityStateChanged {
        entity_hex: u16,
        previous_state: usize,
        current_state: usize,
        changed_at: DateTime<Utc>,
    },
}

impl RegistryEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::CatalogLoaded { .. } => EventTopic::Catalog,
            Self::EntityCreated(_) | Self::EntityDeleted { .. } => EventTopic::EntityLifecycle,
            Self::EntityStateChanged { .. } => EventTopic::EntityState,
        }
    }

    /// Address of the entity concerned, if any.
    #[must_use]
    pub fn entity_hex(&self) -> Option<u16> {
        match self {
            Self::CatalogLoaded { .. } => None,
            Self::EntityCreated(entity) => Some(entity.entity_hex),
            Self::EntityDeleted { entity_hex } | Self::EntityStateChanged { entity_hex, .. } => {
                Some(*entity_hex)
            }
        }
    }

    /// Address rendered for logs, `-` for catalog events.
    #[must_use]
    pub fn entity_label(&self) -> String {
        self.entity_hex()
            .map(format_hex)
            .unwrap_or_else(|| "-".to_string())
    }
}

impl From<RegistryChange> for RegistryEvent {
    fn from(change: RegistryChange) -> Self {
        match change {
            RegistryChange::CatalogLoaded {
                definitions,
                groups,
            } => Self::CatalogLoaded {
                definitions,
                groups,
            },
            RegistryChange::EntityCreated(entity) => Self::EntityCreated(entity),
            RegistryChange::EntityDeleted { entity_hex } => Self::EntityDeleted { entity_hex },
            RegistryChange::EntityTransitioned {
                entity,
                previous_state,
            } => Self::EntityStateChanged {
                entity_hex: entity.entity_hex,
                previous_state,
                current_state: entity.data.current_state,
                changed_at: entity.data.last_updated,
            },
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Bulk catalog loads.
    Catalog,
    /// Entity creation and deletion.
    EntityLifecycle,
    /// Entity state transitions.
    EntityState,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Entity addresses to include. Empty means all entities.
    pub entity_hexes: Vec<u16>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            entity_hexes: Vec::new(),
        }
    }

    /// Create a filter for events about specific entities. Catalog events
    /// carry no address and never match.
    #[must_use]
    pub fn entities(entity_hexes: Vec<u16>) -> Self {
        Self {
            topics: Vec::new(),
            entity_hexes,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RegistryEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let entity_match = self.entity_hexes.is_empty()
            || event
                .entity_hex()
                .is_some_and(|hex| self.entity_hexes.contains(&hex));

        topic_match && entity_match
    }
}
