//! # Event Log Handler
//!
//! Writes every registry event to the structured log, one line per event.

use registry_bus::{EventStream, RegistryEvent};
use registry_telemetry::log_entity_event;
use tokio_stream::StreamExt;
use tracing::info;

/// Logs registry events as they are published.
pub struct EventLogHandler {
    stream: EventStream,
}

impl EventLogHandler {
    pub fn new(stream: EventStream) -> Self {
        Self { stream }
    }

    /// Run until the bus closes. Returns the number of events logged.
    pub async fn run(mut self) -> u64 {
        info!(topics = ?EventStream::filter(&self.stream).topics, "Event log handler started");

        let mut logged = 0;
        while let Some(event) = self.stream.next().await {
            log_event(&event);
            logged += 1;
        }

        info!(logged, "Event log handler stopped");
        logged
    }
}

fn log_event(event: &RegistryEvent) {
    let entity = event.entity_label();
    match event {
        RegistryEvent::CatalogLoaded {
            definitions,
            groups,
        } => {
            info!(definitions, groups, "Catalog loaded");
        }
        RegistryEvent::EntityCreated(created) => {
            log_entity_event!(
                info,
                "Reactive entity created",
                entity,
                id = %created.id,
                groups = created.groups.len()
            );
        }
        RegistryEvent::EntityDeleted { .. } => {
            log_entity_event!(info, "Reactive entity deleted", entity);
        }
        RegistryEvent::EntityStateChanged {
            previous_state,
            current_state,
            changed_at,
            ..
        } => {
            log_entity_event!(
                info,
                "Reactive entity state changed",
                entity,
                previous_state,
                current_state,
                changed_at = %changed_at
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_bus::{EventFilter, EventPublisher, InMemoryEventBus};
    use std::time::Duration;

    #[tokio::test]
    async fn test_handler_drains_until_bus_closes() {
        let bus = InMemoryEventBus::new();
        let handler = EventLogHandler::new(bus.event_stream(EventFilter::all()));
        let task = tokio::spawn(handler.run());

        bus.publish(RegistryEvent::CatalogLoaded {
            definitions: 2,
            groups: 1,
        })
        .await;
        bus.publish(RegistryEvent::EntityDeleted { entity_hex: 0x10 })
            .await;
        drop(bus);

        let logged = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(logged, 2);
    }
}
