//! Agent invocation service.
//!
//! Resolves a model client for the requested provider, assembles the tool
//! list, builds a fresh [`ReactAgent`] for the request and extracts the final
//! assistant message from the run.

use crate::agent::{
    AgentMessage, ChatModel, ModelProvider, OpenAiCompatibleModel, ReactAgent, TavilySearch, Tool,
};
use crate::core::config::AppConfig;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Validated parameters for one agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub model_id: String,
    pub messages: Vec<String>,
    pub allow_search: bool,
    pub system_prompt: String,
    pub provider: ModelProvider,
}

/// Runs an agent for a validated request and returns the final answer.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, request: AgentRequest) -> Result<String>;
}

/// Builds a chat model client for a provider and model identifier.
pub trait ModelResolver: Send + Sync {
    fn resolve(&self, provider: ModelProvider, model_id: &str) -> Result<Arc<dyn ChatModel>>;
}

/// Builds the search tool attached when a request allows search.
pub trait ToolFactory: Send + Sync {
    fn search_tool(&self) -> Result<Arc<dyn Tool>>;
}

/// Resolves models against the configured OpenAI and Groq endpoints.
pub struct ProviderModelResolver {
    config: Arc<AppConfig>,
    http_client: reqwest::Client,
}

impl ProviderModelResolver {
    pub fn new(config: Arc<AppConfig>, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

impl ModelResolver for ProviderModelResolver {
    fn resolve(&self, provider: ModelProvider, model_id: &str) -> Result<Arc<dyn ChatModel>> {
        let credentials = &self.config.credentials;
        let endpoints = &self.config.endpoints;

        let (api_base, api_key) = match provider {
            ModelProvider::Groq => (
                &endpoints.groq_api_base,
                credentials
                    .groq_api_key
                    .as_ref()
                    .ok_or(AppError::MissingCredential("GROQ_API_KEY"))?,
            ),
            ModelProvider::OpenAI => (
                &endpoints.openai_api_base,
                credentials
                    .openai_api_key
                    .as_ref()
                    .ok_or(AppError::MissingCredential("OPENAI_API_KEY"))?,
            ),
        };

        Ok(Arc::new(OpenAiCompatibleModel::new(
            self.http_client.clone(),
            provider,
            api_base.clone(),
            api_key.clone(),
            model_id,
        )))
    }
}

/// Produces [`TavilySearch`] tools from configuration.
pub struct TavilyToolFactory {
    config: Arc<AppConfig>,
    http_client: reqwest::Client,
}

impl TavilyToolFactory {
    pub fn new(config: Arc<AppConfig>, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

impl ToolFactory for TavilyToolFactory {
    fn search_tool(&self) -> Result<Arc<dyn Tool>> {
        let api_key = self
            .config
            .credentials
            .tavily_api_key
            .as_ref()
            .ok_or(AppError::MissingCredential("TAVILY_API_KEY"))?;

        Ok(Arc::new(TavilySearch::new(
            self.http_client.clone(),
            self.config.endpoints.tavily_api_base.clone(),
            api_key.clone(),
            self.config.search_max_results,
        )))
    }
}

/// Exactly one search tool when search is allowed, none otherwise.
pub fn assemble_tools(allow_search: bool, factory: &dyn ToolFactory) -> Result<Vec<Arc<dyn Tool>>> {
    if allow_search {
        Ok(vec![factory.search_tool()?])
    } else {
        Ok(Vec::new())
    }
}

/// Content of the last assistant-authored message in `messages`.
pub fn extract_last_assistant(messages: &[AgentMessage]) -> Result<String> {
    messages
        .iter()
        .rev()
        .find(|m| m.is_assistant())
        .map(|m| m.content().to_string())
        .ok_or(AppError::NoAssistantMessage)
}

/// Build the shared HTTP client used for model and search calls.
pub fn create_http_client(config: &AppConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.verify_ssl)
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .pool_max_idle_per_host(20)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .build()?)
}

/// Production [`AgentInvoker`].
pub struct AgentService {
    models: Arc<dyn ModelResolver>,
    tools: Arc<dyn ToolFactory>,
    max_steps: usize,
}

impl AgentService {
    /// Create a service talking to the providers named in `config`.
    pub fn new(config: Arc<AppConfig>, http_client: reqwest::Client) -> Self {
        let max_steps = config.agent_max_steps;
        Self {
            models: Arc::new(ProviderModelResolver::new(
                config.clone(),
                http_client.clone(),
            )),
            tools: Arc::new(TavilyToolFactory::new(config, http_client)),
            max_steps,
        }
    }

    /// Create a service with custom model and tool sources.
    pub fn with_collaborators(
        models: Arc<dyn ModelResolver>,
        tools: Arc<dyn ToolFactory>,
        max_steps: usize,
    ) -> Self {
        Self {
            models,
            tools,
            max_steps,
        }
    }
}

#[async_trait]
impl AgentInvoker for AgentService {
    #[tracing::instrument(
        skip(self, request),
        fields(
            provider = %request.provider,
            model = %request.model_id,
            allow_search = request.allow_search,
            messages = request.messages.len(),
        )
    )]
    async fn invoke(&self, request: AgentRequest) -> Result<String> {
        let model = self.models.resolve(request.provider, &request.model_id)?;
        let tools = assemble_tools(request.allow_search, self.tools.as_ref())?;
        let tool_count = tools.len();

        let agent =
            ReactAgent::new(model, tools, request.system_prompt).with_max_steps(self.max_steps);

        let input = request
            .messages
            .into_iter()
            .map(AgentMessage::human)
            .collect();
        let state = agent.invoke(input).await?;

        tracing::debug!(
            request_id = %crate::core::logging::get_request_id(),
            tools = tool_count,
            state_messages = state.len(),
            "Agent run completed"
        );

        extract_last_assistant(&state)
    }
}
