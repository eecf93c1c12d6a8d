//! Middleware stack for the API.
//!
//! Layer order: Request → CORS → Tracing → Timeout → Handler

pub mod cors;
pub mod timeout;

pub use cors::create_cors_layer;
pub use timeout::TimeoutLayer;
