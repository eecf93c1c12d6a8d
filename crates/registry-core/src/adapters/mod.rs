//! # Adapters Layer
//!
//! Implementations of the outbound ports.

pub mod memory_store;

pub use memory_store::InMemoryRecordStore;
