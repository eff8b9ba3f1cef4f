//! Route table for the HTTP server.

use crate::api::docs::ApiDoc;
use crate::api::handlers::{chat, health, metrics_handler, AppState};
use crate::core::middleware::{request_id_middleware, MetricsMiddleware};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build router with all endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    let api_routes = Router::new()
        .route("/chat", post(chat))
        .layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics))
        .with_state(state);

    Router::new()
        .merge(swagger_ui)
        .merge(api_routes)
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
