//! Request validation and dispatch.
//!
//! The dispatcher checks a [`ChatRequest`] against the model allow-list and
//! the supported providers. Rejections are returned as an [`ErrorPayload`]
//! without touching any provider; accepted requests are handed to the
//! [`AgentInvoker`] and its answer is returned unchanged.

use crate::agent::ModelProvider;
use crate::api::models::{ChatRequest, ErrorPayload};
use crate::core::metrics::get_metrics;
use crate::core::Result;
use crate::services::agent_service::{AgentInvoker, AgentRequest};
use std::sync::Arc;

/// Model identifiers clients may request.
pub const ALLOWED_MODEL_NAMES: &[&str] = &[
    "llama3-70b-8192",
    "mixtral-8x7b-32768",
    "llama-3.3-70b-versatile",
    "gpt-4o-mini",
];

pub const INVALID_MODEL_MESSAGE: &str = "Invalid model name. Kindly select a valid AI model";
pub const INVALID_PROVIDER_MESSAGE: &str = "Invalid model provider. Kindly select Groq or OpenAI";

pub fn is_allowed_model(model_name: &str) -> bool {
    ALLOWED_MODEL_NAMES.contains(&model_name)
}

/// Result of handling a chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Final assistant message produced by the agent
    Reply(String),
    /// Request failed validation; nothing was invoked
    Rejected(ErrorPayload),
}

/// Validates chat requests and forwards accepted ones to an agent invoker.
#[derive(Clone)]
pub struct ChatDispatcher {
    invoker: Arc<dyn AgentInvoker>,
}

impl ChatDispatcher {
    pub fn new(invoker: Arc<dyn AgentInvoker>) -> Self {
        Self { invoker }
    }

    /// Check a request without invoking anything.
    pub fn validate(&self, request: &ChatRequest) -> std::result::Result<ModelProvider, ErrorPayload> {
        if !is_allowed_model(&request.model_name) {
            reject("invalid_model");
            return Err(ErrorPayload::new(INVALID_MODEL_MESSAGE));
        }

        request.model_provider.parse::<ModelProvider>().map_err(|e| {
            tracing::debug!(error = %e, "Rejecting request");
            reject("invalid_provider");
            ErrorPayload::new(INVALID_PROVIDER_MESSAGE)
        })
    }

    /// Validate `request` and, if accepted, run the agent for it.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatOutcome> {
        let provider = match self.validate(&request) {
            Ok(provider) => provider,
            Err(payload) => {
                tracing::info!(
                    model = %request.model_name,
                    provider = %request.model_provider,
                    reason = %payload.error,
                    "Chat request rejected"
                );
                return Ok(ChatOutcome::Rejected(payload));
            }
        };

        let reply = self
            .invoker
            .invoke(AgentRequest {
                model_id: request.model_name,
                messages: request.messages,
                allow_search: request.allow_search,
                system_prompt: request.system_prompt,
                provider,
            })
            .await?;

        Ok(ChatOutcome::Reply(reply))
    }
}

fn reject(reason: &str) {
    get_metrics()
        .rejected_requests
        .with_label_values(&[reason])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AppError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Invoker that records every request and answers with a fixed string.
    #[derive(Default)]
    struct RecordingInvoker {
        calls: Mutex<Vec<AgentRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl AgentInvoker for RecordingInvoker {
        async fn invoke(&self, request: AgentRequest) -> Result<String> {
            let answer = format!("{} via {}", request.model_id, request.provider);
            self.calls.lock().unwrap().push(request);
            if self.fail {
                Err(AppError::NoAssistantMessage)
            } else {
                Ok(answer)
            }
        }
    }

    fn request(model_name: &str, model_provider: &str) -> ChatRequest {
        ChatRequest {
            model_name: model_name.to_string(),
            model_provider: model_provider.to_string(),
            system_prompt: "Act like a smart assistant".to_string(),
            messages: vec!["What is 2+2?".to_string()],
            allow_search: false,
        }
    }

    #[test]
    fn test_allow_list() {
        for name in ALLOWED_MODEL_NAMES {
            assert!(is_allowed_model(name));
        }
        assert!(!is_allowed_model("gpt-4"));
        assert!(!is_allowed_model("GPT-4O-MINI"));
        assert!(!is_allowed_model(""));
    }

    #[tokio::test]
    async fn test_invalid_model_is_rejected_without_invocation() {
        let invoker = Arc::new(RecordingInvoker::default());
        let dispatcher = ChatDispatcher::new(invoker.clone());

        let outcome = dispatcher
            .handle(request("unknown-model", "OpenAI"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ChatOutcome::Rejected(ErrorPayload::new(INVALID_MODEL_MESSAGE))
        );
        assert!(invoker.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_check_precedes_provider_check() {
        let invoker = Arc::new(RecordingInvoker::default());
        let dispatcher = ChatDispatcher::new(invoker.clone());

        let outcome = dispatcher
            .handle(request("unknown-model", "NotAProvider"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ChatOutcome::Rejected(ErrorPayload::new(INVALID_MODEL_MESSAGE))
        );
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected_without_invocation() {
        let invoker = Arc::new(RecordingInvoker::default());
        let dispatcher = ChatDispatcher::new(invoker.clone());

        let outcome = dispatcher
            .handle(request("gpt-4o-mini", "Anthropic"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ChatOutcome::Rejected(ErrorPayload::new(INVALID_PROVIDER_MESSAGE))
        );
        assert!(invoker.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_request_passes_fields_through() {
        let invoker = Arc::new(RecordingInvoker::default());
        let dispatcher = ChatDispatcher::new(invoker.clone());

        let mut req = request("llama-3.3-70b-versatile", "Groq");
        req.allow_search = true;
        let outcome = dispatcher.handle(req).await.unwrap();

        assert_eq!(
            outcome,
            ChatOutcome::Reply("llama-3.3-70b-versatile via Groq".to_string())
        );

        let calls = invoker.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![AgentRequest {
                model_id: "llama-3.3-70b-versatile".to_string(),
                messages: vec!["What is 2+2?".to_string()],
                allow_search: true,
                system_prompt: "Act like a smart assistant".to_string(),
                provider: ModelProvider::Groq,
            }]
        );
    }

    #[tokio::test]
    async fn test_invoker_errors_propagate() {
        let invoker = Arc::new(RecordingInvoker {
            calls: Mutex::new(Vec::new()),
            fail: true,
        });
        let dispatcher = ChatDispatcher::new(invoker.clone());

        let result = dispatcher.handle(request("gpt-4o-mini", "OpenAI")).await;
        assert!(matches!(result, Err(AppError::NoAssistantMessage)));
        assert_eq!(invoker.calls.lock().unwrap().len(), 1);
    }
}
