//! # Event Handlers
//!
//! Background consumers of the registry event bus.

pub mod event_log;

pub use event_log::EventLogHandler;
