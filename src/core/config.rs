//! Configuration management for the agent proxy.
//!
//! All settings come from the process environment (optionally seeded from a
//! `.env` file). The resulting [`AppConfig`] is built once at startup and shared
//! read-only with every component that needs credentials or endpoints.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Credentials for the model and search providers
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Base URLs of the upstream APIs
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Whether to verify SSL certificates for upstream requests
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// Request timeout in seconds for upstream providers
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum number of model calls a single agent run may make
    #[serde(default = "default_agent_max_steps")]
    pub agent_max_steps: usize,

    /// Number of results the search tool asks for per query
    #[serde(default = "default_search_max_results")]
    pub search_max_results: u32,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,
}

/// API keys for upstream providers.
///
/// Every key is optional. A missing key is only reported when the provider
/// that needs it is actually invoked.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mask(key: &Option<String>) -> &'static str {
            if key.is_some() {
                "<set>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("CredentialsConfig")
            .field("groq_api_key", &mask(&self.groq_api_key))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("tavily_api_key", &mask(&self.tavily_api_key))
            .finish()
    }
}

/// Upstream API base URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_openai_api_base")]
    pub openai_api_base: String,

    #[serde(default = "default_groq_api_base")]
    pub groq_api_base: String,

    #[serde(default = "default_tavily_api_base")]
    pub tavily_api_base: String,
}

impl ServerConfig {
    /// Bind a listener on the configured host and port.
    ///
    /// `host` may be an IP literal (IPv4 or bare IPv6) or a hostname such as
    /// `localhost`, which is resolved before binding.
    pub async fn bind(&self) -> std::io::Result<tokio::net::TcpListener> {
        tokio::net::TcpListener::bind((self.host.as_str(), self.port)).await
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            openai_api_base: default_openai_api_base(),
            groq_api_base: default_groq_api_base(),
            tavily_api_base: default_tavily_api_base(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            credentials: CredentialsConfig::default(),
            endpoints: EndpointsConfig::default(),
            verify_ssl: default_verify_ssl(),
            request_timeout_secs: default_request_timeout(),
            agent_max_steps: default_agent_max_steps(),
            search_max_results: default_search_max_results(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_verify_ssl() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    300
}

fn default_agent_max_steps() -> usize {
    25
}

fn default_search_max_results() -> u32 {
    2
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_groq_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_tavily_api_base() -> String {
    "https://api.tavily.com".to_string()
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// Unset variables fall back to defaults. Malformed numeric values are
    /// reported as errors instead of being silently ignored.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use llm_agent_proxy::core::config::AppConfig;
    ///
    /// let config = AppConfig::from_env().expect("Failed to load config");
    /// println!("binding {}:{}", config.server.host, config.server.port);
    /// ```
    pub fn from_env() -> Result<Self> {
        let mut config = AppConfig::default();

        if let Ok(host) = std::env::var("HOST") {
            config.server.host = host;
        }

        if let Ok(port_str) = std::env::var("PORT") {
            config.server.port = port_str
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", port_str))?;
        }

        if let Ok(verify_ssl_str) = std::env::var("VERIFY_SSL") {
            config.verify_ssl = str_to_bool(&verify_ssl_str);
        }

        if let Ok(timeout_str) = std::env::var("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout_str
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .with_context(|| {
                    format!(
                        "Invalid REQUEST_TIMEOUT_SECS value: {} (expected a positive number of seconds)",
                        timeout_str
                    )
                })?;
        }

        if let Ok(steps_str) = std::env::var("AGENT_MAX_STEPS") {
            config.agent_max_steps = steps_str
                .parse::<usize>()
                .with_context(|| format!("Invalid AGENT_MAX_STEPS value: {}", steps_str))?;
        }

        config.credentials = CredentialsConfig {
            groq_api_key: non_empty_env("GROQ_API_KEY"),
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            tavily_api_key: non_empty_env("TAVILY_API_KEY"),
        };

        if let Some(base) = non_empty_env("OPENAI_API_BASE") {
            config.endpoints.openai_api_base = trim_base(&base);
        }
        if let Some(base) = non_empty_env("GROQ_API_BASE") {
            config.endpoints.groq_api_base = trim_base(&base);
        }
        if let Some(base) = non_empty_env("TAVILY_API_BASE") {
            config.endpoints.tavily_api_base = trim_base(&base);
        }

        Ok(config)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
