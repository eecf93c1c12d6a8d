//! REST routes over the registry.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/api/definitions` | every definition |
//! | GET | `/api/definitions/:name` | one definition |
//! | GET | `/api/groups` | every group |
//! | GET | `/api/groups/:name` | one group |
//! | GET | `/api/reactive-entities` | every entity |
//! | POST | `/api/reactive-entities` | create an entity |
//! | GET | `/api/reactive-entities/byId/:id` | entity by record ID |
//! | GET | `/api/reactive-entities/byHex/:hex` | entity by address |
//! | GET | `/api/reactive-entities/byGroups/:list` | entities in every listed group |
//! | PUT | `/api/reactive-entities/:hex/state` | change the current state |
//! | DELETE | `/api/reactive-entities/:hex` | delete by address |
//! | GET | `/health` | liveness |

use crate::domain::config::ApiConfig;
use crate::domain::error::ApiError;
use crate::middleware::{create_cors_layer, TimeoutLayer};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};
use registry_core::{
    format_hex, parse_hex_address, DefinitionDocument, DeleteOutcome, EntityDocument,
    GroupDocument, RecordId, RecordKind, RegistryApi, RegistryError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Shared state for route handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn RegistryApi>,
}

impl AppState {
    pub fn new(registry: Arc<dyn RegistryApi>) -> Self {
        Self { registry }
    }
}

/// Body of `PUT /api/reactive-entities/:hex/state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    #[serde(rename = "CurrentState")]
    pub current_state: usize,
}

/// Build the API router with its middleware stack.
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    // CORS outermost so timeout responses are annotated too
    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(config))
        .map_response(IntoResponse::into_response)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout));

    Router::new()
        .route("/api/definitions", get(list_definitions))
        .route("/api/definitions/:name", get(get_definition))
        .route("/api/groups", get(list_groups))
        .route("/api/groups/:name", get(get_group))
        .route("/api/reactive-entities", get(list_entities).post(create_entity))
        .route("/api/reactive-entities/byId/:id", get(get_entity_by_id))
        .route("/api/reactive-entities/byHex/:hex", get(get_entity_by_hex))
        .route(
            "/api/reactive-entities/byGroups/:list",
            get(get_entities_by_groups),
        )
        .route("/api/reactive-entities/:hex/state", put(transition_entity))
        .route("/api/reactive-entities/:hex", delete(delete_entity))
        .route("/health", get(health_check))
        .layer(middleware)
        .with_state(state)
}

async fn list_definitions(
    State(state): State<AppState>,
) -> Result<Json<Vec<DefinitionDocument>>, ApiError> {
    Ok(Json(state.registry.list_definitions().await?))
}

async fn get_definition(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DefinitionDocument>, ApiError> {
    Ok(Json(state.registry.get_definition(&name).await?))
}

async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<GroupDocument>>, ApiError> {
    Ok(Json(state.registry.list_groups().await?))
}

async fn get_group(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<GroupDocument>, ApiError> {
    Ok(Json(state.registry.get_group(&name).await?))
}

async fn list_entities(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntityDocument>>, ApiError> {
    Ok(Json(state.registry.list_entities().await?))
}

async fn get_entity_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EntityDocument>, ApiError> {
    let id: RecordId = id.trim().parse().map_err(|_| ApiError::invalid_id(&id))?;
    Ok(Json(state.registry.get_entity(id).await?))
}

async fn get_entity_by_hex(
    State(state): State<AppState>,
    Path(hex): Path<String>,
) -> Result<Json<EntityDocument>, ApiError> {
    let entity_hex = parse_hex_address(&hex)?;
    Ok(Json(state.registry.get_entity_by_hex(entity_hex).await?))
}

async fn get_entities_by_groups(
    State(state): State<AppState>,
    Path(list): Path<String>,
) -> Result<Json<Vec<EntityDocument>>, ApiError> {
    let names: Vec<String> = list.split(',').map(str::to_string).collect();
    Ok(Json(state.registry.get_entities_by_groups(&names).await?))
}

async fn create_entity(
    State(state): State<AppState>,
    payload: Result<Json<EntityDocument>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(document) = payload.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    let entity = state.registry.create_entity(document).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Reactive entity created successfully",
            "entity": entity,
        })),
    ))
}

async fn transition_entity(
    State(state): State<AppState>,
    Path(hex): Path<String>,
    payload: Result<Json<StateChange>, JsonRejection>,
) -> Result<Json<EntityDocument>, ApiError> {
    let entity_hex = parse_hex_address(&hex)?;
    let Json(change) = payload.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    Ok(Json(
        state
            .registry
            .transition_entity(entity_hex, change.current_state)
            .await?,
    ))
}

async fn delete_entity(
    State(state): State<AppState>,
    Path(hex): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entity_hex = parse_hex_address(&hex)?;
    match state.registry.delete_entity(entity_hex).await? {
        DeleteOutcome::Deleted => Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Reactive entity deleted successfully",
                "entityHex": hex,
            })),
        )),
        DeleteOutcome::NotFound => Err(RegistryError::NotFound {
            kind: RecordKind::ReactiveEntity,
            key: format_hex(entity_hex),
        }
        .into()),
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "reactive-registry",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use registry_core::{
        CatalogDocuments, InMemoryRecordStore, NoopEventSink, RegistryConfig,
        RegistryDependencies, RegistryService, StateDocument, SystemTimeSource,
    };
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Never answers; every call waits forever.
    struct StalledRegistry;

    #[async_trait::async_trait]
    impl RegistryApi for StalledRegistry {
        async fn list_definitions(&self) -> Result<Vec<DefinitionDocument>, RegistryError> {
            std::future::pending().await
        }
        async fn get_definition(&self, _: &str) -> Result<DefinitionDocument, RegistryError> {
            std::future::pending().await
        }
        async fn list_groups(&self) -> Result<Vec<GroupDocument>, RegistryError> {
            std::future::pending().await
        }
        async fn get_group(&self, _: &str) -> Result<GroupDocument, RegistryError> {
            std::future::pending().await
        }
        async fn list_entities(&self) -> Result<Vec<EntityDocument>, RegistryError> {
            std::future::pending().await
        }
        async fn get_entity(&self, _: RecordId) -> Result<EntityDocument, RegistryError> {
            std::future::pending().await
        }
        async fn get_entity_by_hex(&self, _: u16) -> Result<EntityDocument, RegistryError> {
            std::future::pending().await
        }
        async fn get_entities_by_groups(
            &self,
            _: &[String],
        ) -> Result<Vec<EntityDocument>, RegistryError> {
            std::future::pending().await
        }
        async fn create_entity(&self, _: EntityDocument) -> Result<EntityDocument, RegistryError> {
            std::future::pending().await
        }
        async fn delete_entity(&self, _: u16) -> Result<DeleteOutcome, RegistryError> {
            std::future::pending().await
        }
        async fn transition_entity(
            &self,
            _: u16,
            _: usize,
        ) -> Result<EntityDocument, RegistryError> {
            std::future::pending().await
        }
    }

    fn from_origin(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ORIGIN, "http://dashboard.local")
            .body(Body::empty())
            .unwrap()
    }

    async fn test_router() -> Router {
        let service = RegistryService::new(
            RegistryDependencies {
                store: InMemoryRecordStore::new(),
                time_source: SystemTimeSource,
                events: NoopEventSink,
            },
            RegistryConfig::default(),
        );
        service
            .load_catalog(&CatalogDocuments {
                definitions: vec![DefinitionDocument {
                    name: "Lamp".into(),
                    description: None,
                    states: vec![
                        StateDocument {
                            hex: "0x00".into(),
                            label: "off".into(),
                        },
                        StateDocument {
                            hex: "0x01".into(),
                            label: "on".into(),
                        },
                    ],
                }],
                groups: vec![
                    GroupDocument {
                        name: "Lights".into(),
                        description: None,
                        allowed_definitions: vec!["Lamp".into()],
                    },
                    GroupDocument {
                        name: "Hall".into(),
                        description: None,
                        allowed_definitions: vec![],
                    },
                ],
            })
            .await
            .unwrap();

        build_router(AppState::new(Arc::new(service)), &ApiConfig::default())
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn lamp(hex: &str, groups: &[&str]) -> Value {
        json!({
            "EntityHex": hex,
            "Definition": "Lamp",
            "Groups": groups,
            "Location": {"Name": "hallway", "Rack": 2}
        })
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router().await;
        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_definitions_and_groups() {
        let router = test_router().await;

        let (status, body) = send(&router, Method::GET, "/api/definitions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["Name"], "Lamp");
        assert_eq!(body[0]["States"][1]["Hex"], "0x01");

        let (status, body) = send(&router, Method::GET, "/api/groups/Lights", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["AllowedDefinitions"], json!(["Lamp"]));

        let (status, body) = send(&router, Method::GET, "/api/definitions/Fan", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["kind"], "NotFound");
    }

    #[tokio::test]
    async fn test_create_and_fetch_entity() {
        let router = test_router().await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/reactive-entities",
            Some(lamp("0x1A", &["Lights"])),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Reactive entity created successfully");
        assert_eq!(body["entity"]["EntityHex"], "0x1a");
        let id = body["entity"]["ID"].as_str().unwrap().to_string();

        let (status, body) = send(
            &router,
            Method::GET,
            &format!("/api/reactive-entities/byId/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Groups"], json!(["Lights"]));

        let (status, body) =
            send(&router, Method::GET, "/api/reactive-entities/byHex/1a", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Location"]["Name"], "hallway");

        let (status, body) = send(&router, Method::GET, "/api/reactive-entities", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejections() {
        let router = test_router().await;
        send(
            &router,
            Method::POST,
            "/api/reactive-entities",
            Some(lamp("0x10", &[])),
        )
        .await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/reactive-entities",
            Some(lamp("0x10", &[])),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["kind"], "Conflict");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/reactive-entities",
            Some(lamp("0xZZ", &[])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "MalformedHex");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/reactive-entities",
            Some(lamp("0x11", &["Nowhere"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "UnresolvedReference");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/reactive-entities",
            Some(json!({"Definition": "Lamp"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "MissingField");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/reactive-entities",
            Some(json!(["not", "an", "entity"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "InvalidBody");
    }

    #[tokio::test]
    async fn test_by_groups_is_intersection() {
        let router = test_router().await;
        for (hex, groups) in [("0x01", vec!["Lights", "Hall"]), ("0x02", vec!["Lights"])] {
            let (status, _) = send(
                &router,
                Method::POST,
                "/api/reactive-entities",
                Some(lamp(hex, &groups)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = send(
            &router,
            Method::GET,
            "/api/reactive-entities/byGroups/Lights,Hall",
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["EntityHex"], "0x01");

        let (_, body) = send(
            &router,
            Method::GET,
            "/api/reactive-entities/byGroups/Lights",
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = send(
            &router,
            Method::GET,
            "/api/reactive-entities/byGroups/Lights,Unknown",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_transition_and_delete() {
        let router = test_router().await;
        send(
            &router,
            Method::POST,
            "/api/reactive-entities",
            Some(lamp("0x20", &[])),
        )
        .await;

        let (status, body) = send(
            &router,
            Method::PUT,
            "/api/reactive-entities/0x20/state",
            Some(json!({"CurrentState": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Data"]["CurrentState"], 1);

        let (status, body) = send(
            &router,
            Method::PUT,
            "/api/reactive-entities/0x20/state",
            Some(json!({"CurrentState": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "StateOutOfRange");

        let (status, body) =
            send(&router, Method::DELETE, "/api/reactive-entities/0x20", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Reactive entity deleted successfully");
        assert_eq!(body["entityHex"], "0x20");

        let (status, _) =
            send(&router, Method::DELETE, "/api/reactive-entities/0x20", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_headers_on_success() {
        let router = test_router().await;
        let response = router
            .oneshot(from_origin("/api/definitions"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_response_carries_cors_headers() {
        let config = ApiConfig {
            request_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let router = build_router(AppState::new(Arc::new(StalledRegistry)), &config);

        let response = router
            .oneshot(from_origin("/api/definitions"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["kind"], "Timeout");
    }

    #[tokio::test]
    async fn test_bad_path_parameters() {
        let router = test_router().await;

        let (status, body) = send(
            &router,
            Method::GET,
            "/api/reactive-entities/byId/not-a-uuid",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "InvalidId");

        let (status, body) =
            send(&router, Method::GET, "/api/reactive-entities/byHex/xyz", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "MalformedHex");
    }
}
