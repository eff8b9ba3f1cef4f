//! API request and response models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chat request accepted by `POST /chat`.
///
/// `model_provider` stays a plain string on the wire so that an unknown tag
/// is reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "model_name": "gpt-4o-mini",
    "model_provider": "OpenAI",
    "system_prompt": "Act like a smart assistant",
    "messages": ["What is 2+2?"],
    "allow_search": false
}))]
pub struct ChatRequest {
    /// Model identifier; must be one of the allow-listed models
    pub model_name: String,

    /// Provider tag: "Groq" or "OpenAI"
    pub model_provider: String,

    /// Instructions the agent follows for the whole conversation
    pub system_prompt: String,

    /// Conversation messages, in order
    pub messages: Vec<String>,

    /// Whether the agent may use web search
    pub allow_search: bool,
}

/// Validation failure returned as a normal response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"error": "Invalid model name. Kindly select a valid AI model"}))]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "ok",
    "allowed_models": ["llama3-70b-8192", "mixtral-8x7b-32768", "llama-3.3-70b-versatile", "gpt-4o-mini"],
    "providers": ["Groq", "OpenAI"]
}))]
pub struct HealthResponse {
    pub status: String,
    pub allowed_models: Vec<String>,
    pub providers: Vec<String>,
}

/// Error response for pipeline failures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": {
        "message": "Agent produced no assistant response",
        "type": "agent_error",
        "code": 502
    }
}))]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail in API error responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: u16,
}
