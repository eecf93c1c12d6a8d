//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: [`RegistryApi`], consumed by the REST adapter.
//! - **Driven Ports (Outbound)**: [`RecordStore`], [`TimeSource`] and
//!   [`EventSink`], implemented by adapters.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
