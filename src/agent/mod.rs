//! Agent collaborators: chat models, tools and the tool-calling loop.
//!
//! These types sit behind narrow traits so the service layer can assemble a
//! fresh agent per request and tests can substitute scripted models and
//! tools.

pub mod message;
pub mod model;
pub mod openai;
pub mod react;
pub mod tavily;
pub mod tool;

pub use message::{AgentMessage, ToolCall, ToolSpec};
pub use model::{ChatModel, ModelProvider, UnknownProvider};
pub use openai::OpenAiCompatibleModel;
pub use react::{ReactAgent, DEFAULT_MAX_STEPS};
pub use tavily::{TavilySearch, TAVILY_TOOL_NAME};
pub use tool::Tool;
