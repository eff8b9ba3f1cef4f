//! Chat model client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Both OpenAI and Groq expose the same Chat Completions wire format, so one
//! client serves both; only the base URL and API key differ.

use crate::agent::message::{AgentMessage, ToolCall, ToolSpec};
use crate::agent::model::{ChatModel, ModelProvider};
use crate::core::metrics::get_metrics;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::time::Instant;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,
    pub function: OpenAIFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAITool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: OpenAIFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIFunction {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAITool>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChatResponse {
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

fn default_call_type() -> String {
    "function".to_string()
}

impl From<&AgentMessage> for OpenAIMessage {
    fn from(message: &AgentMessage) -> Self {
        let base = |role: &str, content: Option<String>| OpenAIMessage {
            role: role.to_string(),
            content,
            name: None,
            tool_calls: None,
            tool_call_id: None,
        };

        match message {
            AgentMessage::System { content } => base("system", Some(content.clone())),
            AgentMessage::Human { content } => base("user", Some(content.clone())),
            AgentMessage::Assistant {
                content,
                tool_calls,
            } => {
                let mut msg = base(
                    "assistant",
                    // Providers reject an empty string next to tool calls
                    if content.is_empty() && !tool_calls.is_empty() {
                        None
                    } else {
                        Some(content.clone())
                    },
                );
                if !tool_calls.is_empty() {
                    msg.tool_calls = Some(
                        tool_calls
                            .iter()
                            .map(|call| OpenAIToolCall {
                                id: call.id.clone(),
                                call_type: default_call_type(),
                                function: OpenAIFunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.arguments.clone(),
                                },
                            })
                            .collect(),
                    );
                }
                msg
            }
            AgentMessage::Tool {
                tool_call_id,
                name,
                content,
            } => OpenAIMessage {
                name: Some(name.clone()),
                tool_call_id: Some(tool_call_id.clone()),
                ..base("tool", Some(content.clone()))
            },
        }
    }
}

impl From<&ToolSpec> for OpenAITool {
    fn from(spec: &ToolSpec) -> Self {
        OpenAITool {
            tool_type: "function".to_string(),
            function: OpenAIFunction {
                name: spec.name.clone(),
                description: Some(spec.description.clone()),
                parameters: spec.parameters.clone(),
            },
        }
    }
}

impl From<OpenAIMessage> for AgentMessage {
    fn from(message: OpenAIMessage) -> Self {
        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        AgentMessage::Assistant {
            content: message.content.unwrap_or_default(),
            tool_calls,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Chat model backed by an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiCompatibleModel {
    client: reqwest::Client,
    provider: ModelProvider,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatibleModel {
    pub fn new(
        client: reqwest::Client,
        provider: ModelProvider,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            provider,
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn build_request(&self, messages: &[AgentMessage], tools: &[ToolSpec]) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(OpenAIMessage::from).collect(),
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(OpenAITool::from).collect())
            },
        }
    }

    fn record_token_usage(&self, usage: &OpenAIUsage) {
        let metrics = get_metrics();
        let provider = self.provider.as_str();
        for (token_type, count) in [
            ("prompt", usage.prompt_tokens),
            ("completion", usage.completion_tokens),
            ("total", usage.total_tokens),
        ] {
            metrics
                .token_usage
                .with_label_values(&[&self.model, provider, token_type])
                .inc_by(count);
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    #[tracing::instrument(
        skip(self, messages, tools),
        fields(
            provider = %self.provider,
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
        )
    )]
    async fn complete(
        &self,
        messages: &[AgentMessage],
        tools: &[ToolSpec],
    ) -> Result<AgentMessage> {
        let url = format!("{}/chat/completions", self.api_base);
        let payload = self.build_request(messages, tools);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    request_id = %crate::core::logging::get_request_id(),
                    provider = %self.provider,
                    url = %url,
                    model = %self.model,
                    error = %e,
                    error_source = ?e.source(),
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "HTTP request failed to provider"
                );
                AppError::from(e)
            })?;

        get_metrics()
            .provider_latency
            .with_label_values(&[self.provider.as_str()])
            .observe(start.elapsed().as_secs_f64());

        let status = response.status();
        tracing::debug!(
            provider = %self.provider,
            url = %url,
            status = %status,
            "HTTP request completed"
        );

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                provider: self.provider.to_string(),
                status: status.as_u16(),
                message: upstream_error_message(&message),
            });
        }

        let body: OpenAIChatResponse = response.json().await?;

        if let Some(usage) = &body.usage {
            self.record_token_usage(usage);
        }

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream {
                provider: self.provider.to_string(),
                status: status.as_u16(),
                message: "response contained no choices".to_string(),
            })?;

        tracing::debug!(
            finish_reason = ?choice.finish_reason,
            tool_calls = choice.message.tool_calls.as_ref().map_or(0, |c| c.len()),
            "Model turn received"
        );

        Ok(AgentMessage::from(choice.message))
    }
}

/// Pull the human-readable message out of an upstream error body.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(|s| s.to_string()))
        })
        .unwrap_or_else(|| body.chars().take(500).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_maps_roles() {
        let model = OpenAiCompatibleModel::new(
            reqwest::Client::new(),
            ModelProvider::Groq,
            "http://localhost",
            "key",
            "llama-3.3-70b-versatile",
        );
        let messages = vec![
            AgentMessage::system("be brief"),
            AgentMessage::human("hi"),
            AgentMessage::Assistant {
                content: String::new(),
                tool_calls: vec![ToolCall {
                    id: "call_1".to_string(),
                    name: "search".to_string(),
                    arguments: r#"{"query":"rust"}"#.to_string(),
                }],
            },
            AgentMessage::tool("call_1", "search", "[]"),
        ];

        let request = serde_json::to_value(model.build_request(&messages, &[])).unwrap();

        assert_eq!(
            request,
            json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "search", "arguments": "{\"query\":\"rust\"}"}
                    }]},
                    {"role": "tool", "content": "[]", "name": "search", "tool_call_id": "call_1"}
                ]
            })
        );
    }

    #[test]
    fn test_request_includes_tools_only_when_present() {
        let model = OpenAiCompatibleModel::new(
            reqwest::Client::new(),
            ModelProvider::OpenAI,
            "http://localhost",
            "key",
            "gpt-4o-mini",
        );
        let spec = ToolSpec {
            name: "search".to_string(),
            description: "look things up".to_string(),
            parameters: json!({"type": "object"}),
        };

        let with_tools = model.build_request(&[AgentMessage::human("q")], &[spec]);
        let tools = with_tools.tools.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].tool_type, "function");
        assert_eq!(tools[0].function.name, "search");

        let without = model.build_request(&[AgentMessage::human("q")], &[]);
        assert!(without.tools.is_none());
    }

    #[test]
    fn test_response_message_becomes_assistant() {
        let message: OpenAIMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_9",
                "type": "function",
                "function": {"name": "search", "arguments": "{\"query\":\"news\"}"}
            }]
        }))
        .unwrap();

        let converted = AgentMessage::from(message);
        assert_eq!(converted.content(), "");
        assert_eq!(converted.tool_calls().len(), 1);
        assert_eq!(converted.tool_calls()[0].id, "call_9");
    }

    #[test]
    fn test_upstream_error_message_extraction() {
        assert_eq!(
            upstream_error_message(r#"{"error":{"message":"Invalid API key"}}"#),
            "Invalid API key"
        );
        assert_eq!(upstream_error_message(r#"{"error":"rate limited"}"#), "rate limited");
        assert_eq!(upstream_error_message("plain failure"), "plain failure");
    }
}
