//! Single-use reason-and-act agent.
//!
//! The agent alternates between asking the model for the next turn and
//! executing any tools that turn requests, until the model answers without
//! tool calls or the step budget runs out.

use crate::agent::message::{AgentMessage, ToolCall, ToolSpec};
use crate::agent::model::ChatModel;
use crate::agent::tool::Tool;
use crate::core::{AppError, Result};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;

/// Default upper bound on model calls per invocation.
pub const DEFAULT_MAX_STEPS: usize = 25;

/// Agent bound to one model, one tool set and one system prompt.
pub struct ReactAgent {
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
    system_prompt: String,
    max_steps: usize,
}

impl ReactAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: Vec<Arc<dyn Tool>>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model,
            tools,
            system_prompt: system_prompt.into(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    /// Run the agent over `messages`.
    ///
    /// Returns the conversation state after the run: the input messages
    /// followed by every assistant and tool message produced. The system
    /// prompt is sent to the model but is not part of the returned state.
    pub async fn invoke(&self, messages: Vec<AgentMessage>) -> Result<Vec<AgentMessage>> {
        let specs = self.tool_specs();
        let has_system = !self.system_prompt.is_empty();

        let mut conversation = Vec::with_capacity(messages.len() + 2);
        if has_system {
            conversation.push(AgentMessage::system(self.system_prompt.clone()));
        }
        conversation.extend(messages);

        for step in 1..=self.max_steps {
            let reply = self.model.complete(&conversation, &specs).await?;
            let calls = reply.tool_calls().to_vec();
            conversation.push(reply);

            if calls.is_empty() {
                tracing::debug!(
                    model = %self.model.model_id(),
                    steps = step,
                    "Agent finished"
                );
                if has_system {
                    conversation.remove(0);
                }
                return Ok(conversation);
            }

            tracing::debug!(
                model = %self.model.model_id(),
                step,
                tool_calls = calls.len(),
                "Agent requested tools"
            );

            let outputs = join_all(calls.iter().map(|call| self.run_tool(call))).await;
            conversation.extend(outputs);
        }

        tracing::warn!(
            model = %self.model.model_id(),
            max_steps = self.max_steps,
            "Agent step limit reached"
        );
        Err(AppError::StepLimitExceeded(self.max_steps))
    }

    /// Execute one tool call. Failures are reported back to the model as the
    /// tool's output so it can correct itself.
    async fn run_tool(&self, call: &ToolCall) -> AgentMessage {
        let Some(tool) = self.tools.iter().find(|t| t.spec().name == call.name) else {
            let available: Vec<String> = self.tools.iter().map(|t| t.spec().name).collect();
            return AgentMessage::tool(
                &call.id,
                &call.name,
                format!(
                    "Error: {} is not a valid tool, try one of [{}].",
                    call.name,
                    available.join(", ")
                ),
            );
        };

        let arguments = if call.arguments.trim().is_empty() {
            Ok(Value::Object(Default::default()))
        } else {
            serde_json::from_str::<Value>(&call.arguments)
        };

        let output = match arguments {
            Ok(arguments) => tool.call(arguments).await,
            Err(e) => Err(AppError::from(e)),
        };

        match output {
            Ok(content) => AgentMessage::tool(&call.id, &call.name, content),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                AgentMessage::tool(
                    &call.id,
                    &call.name,
                    format!("Error: {}\n Please fix your mistakes.", e),
                )
            }
        }
    }
}
