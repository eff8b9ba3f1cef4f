//! HTTP request handlers for the agent proxy API.

use crate::agent::ModelProvider;
use crate::api::models::*;
use crate::core::config::AppConfig;
use crate::core::logging::get_request_id;
use crate::core::middleware::{ModelName, ProviderName};
use crate::core::{AppError, Result};
use crate::services::{
    create_http_client, AgentInvoker, AgentService, ChatDispatcher, ChatOutcome,
    ALLOWED_MODEL_NAMES,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: ChatDispatcher,
}

impl AppState {
    /// Build state wired to the real providers described by `config`.
    pub fn new(config: AppConfig) -> Result<Self> {
        let config = Arc::new(config);
        let http_client = create_http_client(&config)?;
        let invoker = Arc::new(AgentService::new(config.clone(), http_client));
        Ok(Self::with_invoker(config, invoker))
    }

    /// Build state around a custom agent invoker.
    pub fn with_invoker(config: Arc<AppConfig>, invoker: Arc<dyn AgentInvoker>) -> Self {
        Self {
            config,
            dispatcher: ChatDispatcher::new(invoker),
        }
    }
}

/// Chat with an agent built around the requested model.
///
/// Validation failures are answered with `200` and an `{"error": ...}` body.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Final assistant message as a JSON string, or an ErrorPayload when validation fails", body = String),
        (status = 422, description = "Malformed request body"),
        (status = 500, description = "Agent or configuration failure", body = ApiErrorResponse),
        (status = 502, description = "Upstream provider failure", body = ApiErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, payload),
    fields(
        model = %payload.model_name,
        provider = %payload.model_provider,
        allow_search = payload.allow_search,
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response> {
    let model = payload.model_name.clone();
    let provider = payload.model_provider.clone();

    tracing::debug!(
        request_id = %get_request_id(),
        messages = payload.messages.len(),
        "Processing chat request"
    );

    match state.dispatcher.handle(payload).await? {
        ChatOutcome::Reply(content) => {
            let mut response = Json(content).into_response();
            response.extensions_mut().insert(ModelName(model));
            response.extensions_mut().insert(ProviderName(provider));
            Ok(response)
        }
        ChatOutcome::Rejected(error) => Ok(Json(error).into_response()),
    }
}

/// Basic health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        allowed_models: ALLOWED_MODEL_NAMES.iter().map(|m| m.to_string()).collect(),
        providers: ModelProvider::ALL
            .iter()
            .map(|p| p.as_str().to_string())
            .collect(),
    })
}

/// Prometheus metrics endpoint.
#[tracing::instrument]
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response())
}
