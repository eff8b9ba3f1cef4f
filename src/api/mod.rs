//! API layer for the agent proxy.
//!
//! This module contains the HTTP handlers, request/response models, the
//! OpenAPI document and the route table.

pub mod docs;
pub mod handlers;
pub mod models;
pub mod router;

// Re-export commonly used types
pub use docs::ApiDoc;
pub use handlers::{chat, health, metrics_handler, AppState};
pub use models::{ApiErrorDetail, ApiErrorResponse, ChatRequest, ErrorPayload, HealthResponse};
pub use router::build_router;
