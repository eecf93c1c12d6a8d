//! # Domain Errors
//!
//! Error types for the registry. Every validation, conversion and request
//! failure is one of the [`RegistryError`] variants below; the serializable
//! [`RegistryErrorKind`] is what crosses the API boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The three record collections held by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Definition,
    Group,
    ReactiveEntity,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition => write!(f, "definition"),
            Self::Group => write!(f, "group"),
            Self::ReactiveEntity => write!(f, "reactive entity"),
        }
    }
}

/// Errors raised by validation, conversion and the registry service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Malformed hex value {input:?}: {reason}")]
    MalformedHex { input: String, reason: String },

    #[error("Duplicate {kind} name detected: {name}")]
    DuplicateName { kind: RecordKind, name: String },

    #[error("Definition '{definition}' has an empty states list")]
    EmptyStates { definition: String },

    #[error("Duplicate state hex value '{hex}' detected in definition '{definition}'")]
    DuplicateStateHex { definition: String, hex: String },

    #[error("Invalid {kind} reference '{name}' in '{owner}', not found")]
    UnresolvedReference {
        owner: String,
        kind: RecordKind,
        name: String,
    },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Reactive entity with EntityHex {entity_hex} already exists")]
    Conflict { entity_hex: String },

    #[error("{kind} not found: {key}")]
    NotFound { kind: RecordKind, key: String },

    #[error("State index {index} out of range for entity {entity_hex} ({states} states)")]
    StateOutOfRange {
        entity_hex: String,
        index: usize,
        states: usize,
    },

    #[error("Record store unavailable during {operation}: {reason}")]
    StoreUnavailable { operation: String, reason: String },

    #[error("Invalid document {path}: {reason}")]
    Document { path: String, reason: String },
}

impl RegistryError {
    /// Serializable error classification.
    pub fn kind(&self) -> RegistryErrorKind {
        match self {
            Self::MalformedHex { .. } => RegistryErrorKind::MalformedHex,
            Self::DuplicateName { .. } => RegistryErrorKind::DuplicateName,
            Self::EmptyStates { .. } => RegistryErrorKind::EmptyStates,
            Self::DuplicateStateHex { .. } => RegistryErrorKind::DuplicateStateHex,
            Self::UnresolvedReference { .. } => RegistryErrorKind::UnresolvedReference,
            Self::MissingField { .. } => RegistryErrorKind::MissingField,
            Self::Conflict { .. } => RegistryErrorKind::Conflict,
            Self::NotFound { .. } => RegistryErrorKind::NotFound,
            Self::StateOutOfRange { .. } => RegistryErrorKind::StateOutOfRange,
            Self::StoreUnavailable { .. } => RegistryErrorKind::StoreUnavailable,
            Self::Document { .. } => RegistryErrorKind::Document,
        }
    }

    pub(crate) fn malformed_hex(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedHex {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: RecordKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }
}

/// Error type enumeration for API serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryErrorKind {
    MalformedHex,
    DuplicateName,
    EmptyStates,
    DuplicateStateHex,
    UnresolvedReference,
    MissingField,
    Conflict,
    NotFound,
    StateOutOfRange,
    StoreUnavailable,
    Document,
}

/// Failures reported by a [`RecordStore`](crate::ports::RecordStore) adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store connection error: {message}")]
    Connection { message: String },

    #[error("Store operation failed: {message}")]
    Operation { message: String },
}
