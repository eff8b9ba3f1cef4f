//! Web search tool backed by the Tavily search API.

use crate::agent::message::ToolSpec;
use crate::agent::tool::Tool;
use crate::core::metrics::get_metrics;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Name under which the search tool is advertised to models.
pub const TAVILY_TOOL_NAME: &str = "tavily_search_results_json";

const TAVILY_TOOL_DESCRIPTION: &str = "A search engine optimized for comprehensive, accurate, \
and trusted results. Useful for when you need to answer questions about current events. \
Input should be a search query.";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    url: String,
    #[serde(default)]
    content: String,
}

/// Search tool returning at most `max_results` hits per query.
#[derive(Clone)]
pub struct TavilySearch {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    max_results: u32,
}

impl TavilySearch {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        max_results: u32,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            max_results,
        }
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Run a query and return `(url, content)` pairs.
    pub async fn search(&self, query: &str) -> Result<Vec<(String, String)>> {
        let url = format!("{}/search", self.api_base);
        let response = self
            .client
            .post(&url)
            .json(&SearchRequest {
                api_key: &self.api_key,
                query,
                max_results: self.max_results,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                provider: "Tavily".to_string(),
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let body: SearchResponse = response.json().await?;
        tracing::debug!(query = %query, hits = body.results.len(), "Search completed");

        Ok(body
            .results
            .into_iter()
            .take(self.max_results as usize)
            .map(|hit| (hit.url, hit.content))
            .collect())
    }
}

#[async_trait]
impl Tool for TavilySearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TAVILY_TOOL_NAME.to_string(),
            description: TAVILY_TOOL_DESCRIPTION.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "search query to look up"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> Result<String> {
        let query = arguments
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::BadRequest("missing string argument 'query'".to_string()))?;

        let outcome = self.search(query).await;
        get_metrics()
            .tool_calls
            .with_label_values(&[TAVILY_TOOL_NAME, if outcome.is_ok() { "ok" } else { "error" }])
            .inc();

        let hits: Vec<Value> = outcome?
            .into_iter()
            .map(|(url, content)| json!({"url": url, "content": content}))
            .collect();
        Ok(serde_json::to_string(&hits)?)
    }
}
