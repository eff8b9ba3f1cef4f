//! Business logic services for the agent proxy.
//!
//! This module contains the request dispatcher and the agent invoker it
//! delegates to.

pub mod agent_service;
pub mod dispatcher;

// Re-export commonly used types
pub use agent_service::{
    assemble_tools, create_http_client, extract_last_assistant, AgentInvoker, AgentRequest,
    AgentService, ModelResolver, ProviderModelResolver, TavilyToolFactory, ToolFactory,
};
pub use dispatcher::{
    is_allowed_model, ChatDispatcher, ChatOutcome, ALLOWED_MODEL_NAMES, INVALID_MODEL_MESSAGE,
    INVALID_PROVIDER_MESSAGE,
};
