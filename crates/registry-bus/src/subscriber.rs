//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{EventFilter, RegistryEvent};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// A filtered subscription to the bus.
///
/// Implements `tokio_stream::Stream` for use with stream combinators. Ends
/// once the bus is dropped; lagged events are skipped.
pub struct EventStream {
    inner: BroadcastStream<RegistryEvent>,
    filter: EventFilter,
}

impl EventStream {
    pub(crate) fn new(receiver: broadcast::Receiver<RegistryEvent>, filter: EventFilter) -> Self {
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
        }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = RegistryEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if self.filter.matches(&event) {
                        return Poll::Ready(Some(event));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, some events dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use crate::publisher::{EventPublisher, InMemoryEventBus};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_stream_receives_published_event() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::all());

        bus.publish(RegistryEvent::EntityDeleted { entity_hex: 1 })
            .await;

        let received = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout")
            .expect("event");

        assert_eq!(received, RegistryEvent::EntityDeleted { entity_hex: 1 });
    }

    #[tokio::test]
    async fn test_stream_filters_by_topic() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::topics(vec![EventTopic::Catalog]));

        bus.publish(RegistryEvent::EntityDeleted { entity_hex: 1 })
            .await;
        bus.publish(RegistryEvent::CatalogLoaded {
            definitions: 2,
            groups: 1,
        })
        .await;

        let received = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout")
            .expect("event");

        assert!(matches!(received, RegistryEvent::CatalogLoaded { .. }));
    }

    #[tokio::test]
    async fn test_stream_filters_by_entity() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::entities(vec![0x20]));

        bus.publish(RegistryEvent::EntityDeleted { entity_hex: 0x10 })
            .await;
        bus.publish(RegistryEvent::EntityDeleted { entity_hex: 0x20 })
            .await;

        let next = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout");
        assert_eq!(next, Some(RegistryEvent::EntityDeleted { entity_hex: 0x20 }));
        assert_eq!(EventStream::filter(&stream).entity_hexes, vec![0x20]);
    }

    #[tokio::test]
    async fn test_stream_ends_after_bus_dropped() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::all());
        drop(bus);

        assert_eq!(stream.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_pending_without_events() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::all());

        assert!(timeout(Duration::from_millis(50), stream.next()).await.is_err());
    }
}
