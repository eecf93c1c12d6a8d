//! # Catalog Loader
//!
//! One-shot bulk load of the definition and group documents. Runs at
//! startup, before the API is reachable, and replaces whatever catalog the
//! store held before (drop then insert).
//!
//! ```text
//! definitions.json ──validate──→ replace_definitions ──┐
//!                                                      ↓ (resolve names)
//! groups.json ─────────────────────validate──→ replace_groups
//! ```
//!
//! Both documents are validated before anything is written, so a rejected
//! batch leaves the previous catalog untouched.

use crate::domain::{
    validate_definitions, validate_groups, Definition, DefinitionDocument, GroupDocument,
    RecordId, RegistryError,
};
use crate::ports::RecordStore;
use crate::service::with_deadline;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

pub const DEFINITIONS_FILE: &str = "definitions.json";
pub const GROUPS_FILE: &str = "groups.json";

/// Raw catalog documents as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogDocuments {
    pub definitions: Vec<DefinitionDocument>,
    pub groups: Vec<GroupDocument>,
}

/// Counts of records written by a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub definitions: usize,
    pub groups: usize,
}

/// Read `definitions.json` and `groups.json` from `directory`.
pub async fn read_documents(directory: &Path) -> Result<CatalogDocuments, RegistryError> {
    Ok(CatalogDocuments {
        definitions: read_document(&directory.join(DEFINITIONS_FILE)).await?,
        groups: read_document(&directory.join(GROUPS_FILE)).await?,
    })
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let document_error = |reason: String| RegistryError::Document {
        path: path.display().to_string(),
        reason,
    };

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| document_error(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| document_error(e.to_string()))
}

/// Validate `documents` and replace the stored catalog with them.
///
/// Every store call is bounded by `deadline`.
pub async fn load_catalog<S>(
    store: &S,
    documents: &CatalogDocuments,
    deadline: Duration,
) -> Result<CatalogSummary, RegistryError>
where
    S: RecordStore + ?Sized,
{
    let definitions = validate_definitions(&documents.definitions).map_err(|e| {
        error!(error = %e, "Definition validation failed, catalog not loaded");
        e
    })?;

    // Resolve group references before writing anything.
    let provisional: Vec<Definition> = definitions
        .iter()
        .cloned()
        .map(|d| d.with_id(RecordId::generate()))
        .collect();
    validate_groups(&documents.groups, &provisional).map_err(|e| {
        error!(error = %e, "Group validation failed, catalog not loaded");
        e
    })?;

    let stored_definitions = with_deadline(
        "replace_definitions",
        deadline,
        store.replace_definitions(definitions),
    )
    .await?;

    let groups = validate_groups(&documents.groups, &stored_definitions)?;
    let stored_groups = with_deadline("replace_groups", deadline, store.replace_groups(groups)).await?;

    let summary = CatalogSummary {
        definitions: stored_definitions.len(),
        groups: stored_groups.len(),
    };
    info!(
        definitions = summary.definitions,
        groups = summary.groups,
        "Catalog loaded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRecordStore;
    use std::fs;

    const DEADLINE: Duration = Duration::from_secs(1);

    const DEFINITIONS: &str = r#"[
        {"Name": "Lamp", "Description": "ceiling lamp", "States": [
            {"Hex": "0x00", "Label": "off"},
            {"Hex": "0x01", "Label": "on"}
        ]},
        {"Name": "Door", "States": [{"Hex": "0x10", "Label": "closed"}]}
    ]"#;

    const GROUPS: &str = r#"[
        {"Name": "Floor1", "AllowedDefinitions": ["Lamp", "Door"]}
    ]"#;

    fn write_documents(definitions: &str, groups: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFINITIONS_FILE), definitions).unwrap();
        fs::write(dir.path().join(GROUPS_FILE), groups).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let dir = write_documents(DEFINITIONS, GROUPS);
        let store = InMemoryRecordStore::new();

        let documents = read_documents(dir.path()).await.unwrap();
        let summary = load_catalog(&store, &documents, DEADLINE).await.unwrap();

        assert_eq!(
            summary,
            CatalogSummary {
                definitions: 2,
                groups: 1
            }
        );
        let lamp = store.find_definition_by_name("Lamp").await.unwrap().unwrap();
        let group = store.find_group_by_name("Floor1").await.unwrap().unwrap();
        assert_eq!(group.allowed_definitions[0], lamp.id);
    }

    #[tokio::test]
    async fn test_missing_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_documents(dir.path()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Document { path, .. } if path.ends_with(DEFINITIONS_FILE)));
    }

    #[tokio::test]
    async fn test_malformed_document_is_reported() {
        let dir = write_documents("[{\"Name\": ", GROUPS);
        assert!(matches!(
            read_documents(dir.path()).await,
            Err(RegistryError::Document { .. })
        ));
    }

    #[tokio::test]
    async fn test_reload_replaces_catalog() {
        let store = InMemoryRecordStore::new();
        let first = read_documents(write_documents(DEFINITIONS, GROUPS).path())
            .await
            .unwrap();
        load_catalog(&store, &first, DEADLINE).await.unwrap();

        let second = CatalogDocuments {
            definitions: vec![DefinitionDocument {
                name: "Fan".into(),
                description: None,
                states: first.definitions[0].states.clone(),
            }],
            groups: vec![],
        };
        load_catalog(&store, &second, DEADLINE).await.unwrap();

        let names: Vec<_> = store
            .find_definitions()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Fan"]);
        assert!(store.find_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_groups_leave_previous_catalog() {
        let store = InMemoryRecordStore::new();
        let good = read_documents(write_documents(DEFINITIONS, GROUPS).path())
            .await
            .unwrap();
        load_catalog(&store, &good, DEADLINE).await.unwrap();

        let bad = CatalogDocuments {
            definitions: vec![],
            groups: good.groups.clone(),
        };
        let err = load_catalog(&store, &bad, DEADLINE).await.unwrap_err();

        assert!(matches!(err, RegistryError::UnresolvedReference { .. }));
        assert_eq!(store.find_definitions().await.unwrap().len(), 2);
    }
}
