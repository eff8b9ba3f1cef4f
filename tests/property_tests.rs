//! Property-based tests for request validation and dispatch.

use async_trait::async_trait;
use llm_agent_proxy::{
    services::ALLOWED_MODEL_NAMES, AgentInvoker, AgentRequest, ChatDispatcher, ChatOutcome,
    ChatRequest, ErrorPayload, ModelProvider, Result,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingInvoker {
    calls: Mutex<Vec<AgentRequest>>,
}

#[async_trait]
impl AgentInvoker for RecordingInvoker {
    async fn invoke(&self, request: AgentRequest) -> Result<String> {
        let reply = format!("reply from {}", request.model_id);
        self.calls.lock().unwrap().push(request);
        Ok(reply)
    }
}

fn run(dispatcher: &ChatDispatcher, request: ChatRequest) -> ChatOutcome {
    tokio_test::block_on(dispatcher.handle(request)).unwrap()
}

fn provider_strategy() -> impl Strategy<Value = ModelProvider> {
    prop_oneof![Just(ModelProvider::Groq), Just(ModelProvider::OpenAI)]
}

proptest! {
    #[test]
    fn test_unlisted_model_is_rejected_without_invocation(
        model_name in "[a-zA-Z0-9.\\-]{0,40}",
        provider in provider_strategy(),
        system_prompt in ".{0,64}",
        messages in prop::collection::vec(".{0,32}", 0..4),
        allow_search in any::<bool>(),
    ) {
        prop_assume!(!ALLOWED_MODEL_NAMES.contains(&model_name.as_str()));

        let invoker = Arc::new(RecordingInvoker::default());
        let dispatcher = ChatDispatcher::new(invoker.clone());

        let outcome = run(&dispatcher, ChatRequest {
            model_name,
            model_provider: provider.to_string(),
            system_prompt,
            messages,
            allow_search,
        });

        prop_assert_eq!(
            outcome,
            ChatOutcome::Rejected(ErrorPayload::new(
                "Invalid model name. Kindly select a valid AI model"
            ))
        );
        prop_assert!(invoker.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_allowed_model_is_forwarded_unchanged(
        model_index in 0..ALLOWED_MODEL_NAMES.len(),
        provider in provider_strategy(),
        system_prompt in ".{0,64}",
        messages in prop::collection::vec(".{0,32}", 0..4),
        allow_search in any::<bool>(),
    ) {
        let model_name = ALLOWED_MODEL_NAMES[model_index].to_string();
        let invoker = Arc::new(RecordingInvoker::default());
        let dispatcher = ChatDispatcher::new(invoker.clone());

        let outcome = run(&dispatcher, ChatRequest {
            model_name: model_name.clone(),
            model_provider: provider.to_string(),
            system_prompt: system_prompt.clone(),
            messages: messages.clone(),
            allow_search,
        });

        prop_assert_eq!(outcome, ChatOutcome::Reply(format!("reply from {}", model_name)));

        let calls = invoker.calls.lock().unwrap();
        prop_assert_eq!(calls.len(), 1);
        prop_assert_eq!(&calls[0], &AgentRequest {
            model_id: model_name,
            messages,
            allow_search,
            system_prompt,
            provider,
        });
    }

    #[test]
    fn test_unknown_provider_is_rejected_after_model_check(
        model_index in 0..ALLOWED_MODEL_NAMES.len(),
        provider in "[a-zA-Z]{0,12}",
    ) {
        prop_assume!(provider != "Groq" && provider != "OpenAI");

        let invoker = Arc::new(RecordingInvoker::default());
        let dispatcher = ChatDispatcher::new(invoker.clone());

        let outcome = run(&dispatcher, ChatRequest {
            model_name: ALLOWED_MODEL_NAMES[model_index].to_string(),
            model_provider: provider,
            system_prompt: String::new(),
            messages: vec!["hello".to_string()],
            allow_search: false,
        });

        prop_assert_eq!(
            outcome,
            ChatOutcome::Rejected(ErrorPayload::new(
                "Invalid model provider. Kindly select Groq or OpenAI"
            ))
        );
        prop_assert!(invoker.calls.lock().unwrap().is_empty());
    }
}
