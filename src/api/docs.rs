//! OpenAPI documentation for the public endpoints.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::chat,
        crate::api::handlers::health,
    ),
    components(
        schemas(
            crate::api::models::ChatRequest,
            crate::api::models::ErrorPayload,
            crate::api::models::HealthResponse,
            crate::api::models::ApiErrorResponse,
            crate::api::models::ApiErrorDetail,
            crate::agent::ModelProvider,
        )
    ),
    tags(
        (name = "chat", description = "Agent chat endpoint"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "LLM Agent Proxy API",
        version = "1.0.0",
        description = "Chat with a search-capable agent backed by Groq or OpenAI models.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://127.0.0.1:9999", description = "Local development server")
    )
)]
pub struct ApiDoc;
