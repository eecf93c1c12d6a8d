//! CORS layer built from the API configuration.

use crate::domain::config::ApiConfig;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Create the CORS layer. An empty origin list allows any origin.
pub fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    cors.allow_origin(origins)
}
