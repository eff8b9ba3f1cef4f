//! Chat model abstraction and the set of supported providers.

use crate::agent::message::{AgentMessage, ToolSpec};
use crate::core::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Backend vendors able to serve chat completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ModelProvider {
    Groq,
    OpenAI,
}

impl ModelProvider {
    pub const ALL: [ModelProvider; 2] = [ModelProvider::Groq, ModelProvider::OpenAI];

    /// Wire tag of the provider, as accepted in requests.
    pub const fn as_str(self) -> &'static str {
        match self {
            ModelProvider::Groq => "Groq",
            ModelProvider::OpenAI => "OpenAI",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a provider tag does not name a supported provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported model provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ModelProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ModelProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// A language model that produces one assistant turn per call.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier of the underlying model, e.g. `gpt-4o-mini`.
    fn model_id(&self) -> &str;

    /// Produce the next assistant message for `messages`, optionally
    /// requesting calls to any of `tools`.
    async fn complete(&self, messages: &[AgentMessage], tools: &[ToolSpec])
        -> Result<AgentMessage>;
}
