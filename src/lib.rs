//! LLM Agent Proxy - an HTTP façade in front of search-capable chat agents
//!
//! A single `POST /chat` endpoint accepts a model name, a provider tag, a
//! system prompt and a list of messages. Requests naming a model outside the
//! allow-list are answered with an error payload; all others are served by
//! a freshly built reason-and-act agent that talks to Groq or OpenAI and may
//! call a Tavily web search tool.
//!
//! # Architecture
//!
//! - [`core`]: Core functionality (config, errors, logging context, metrics, middleware)
//! - [`api`]: HTTP handlers, request/response models, OpenAPI docs and routing
//! - [`services`]: Request validation/dispatch and agent invocation
//! - [`agent`]: Chat model clients, tools and the tool-calling agent loop
//!
//! # Configuration
//!
//! Credentials are read from the environment (a `.env` file is honoured):
//! - `GROQ_API_KEY`, `OPENAI_API_KEY`, `TAVILY_API_KEY`
//!
//! Optional environment variables:
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 9999)
//! - `VERIFY_SSL`: Verify SSL certificates for upstream (default: true)
//! - `REQUEST_TIMEOUT_SECS`: Upstream request timeout in seconds (default: 300)
//! - `AGENT_MAX_STEPS`: Model calls allowed per agent run (default: 25)
//! - `OPENAI_API_BASE`, `GROQ_API_BASE`, `TAVILY_API_BASE`: endpoint overrides

pub mod agent;
pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use agent::{AgentMessage, ChatModel, ModelProvider, ReactAgent, Tool};
pub use api::{build_router, AppState, ChatRequest, ErrorPayload};
pub use core::{AppConfig, AppError, Result};
pub use services::{AgentInvoker, AgentRequest, AgentService, ChatDispatcher, ChatOutcome};
