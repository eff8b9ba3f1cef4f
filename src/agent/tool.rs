//! Tool abstraction for capabilities an agent may invoke.

use crate::agent::message::ToolSpec;
use crate::core::Result;
use async_trait::async_trait;
use serde_json::Value;

/// An external capability the model can call during an agent run.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Description advertised to the model.
    fn spec(&self) -> ToolSpec;

    /// Run the tool with model-supplied arguments and return its textual output.
    async fn call(&self, arguments: Value) -> Result<String>;
}
