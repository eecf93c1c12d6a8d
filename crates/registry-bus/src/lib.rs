//! # Registry Bus - Change Notifications
//!
//! Broadcasts registry changes to in-process subscribers.
//!
//! ```text
//! ┌──────────────────┐  publish_change()  ┌──────────────┐
//! │ RegistryService  │ ─────────────────→ │  Event Bus   │
//! └──────────────────┘                    │              │ ──→ event_stream()
//!                                         └──────────────┘
//! ```
//!
//! The bus implements the registry's [`EventSink`](registry_core::EventSink)
//! port. Publishing with no subscribers drops the event.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, RegistryEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::EventStream;

/// Maximum events to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
