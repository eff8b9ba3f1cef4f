//! Prometheus metrics for monitoring the agent proxy.
//!
//! This module provides a centralized metrics registry for tracking requests,
//! latency, upstream provider calls, token usage and tool invocations.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, GaugeVec, HistogramVec,
    IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of requests by method, endpoint, model, provider, and status
    pub request_count: IntCounterVec,

    /// Request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Requests rejected by validation, by reason
    pub rejected_requests: IntCounterVec,

    /// Total token usage by model, provider, and token type
    pub token_usage: IntCounterVec,

    /// Upstream model call latency histogram in seconds
    pub provider_latency: HistogramVec,

    /// Tool invocations by tool name and outcome
    pub tool_calls: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// This should be called once at application startup. Subsequent calls
/// return the same instance.
///
/// # Examples
///
/// ```no_run
/// use llm_agent_proxy::core::metrics::init_metrics;
///
/// let metrics = init_metrics();
/// metrics.request_count.with_label_values(&["POST", "/chat", "gpt-4o-mini", "OpenAI", "200"]).inc();
/// ```
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "llm_agent_proxy_requests_total",
            "Total number of requests",
            &["method", "endpoint", "model", "provider", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "llm_agent_proxy_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint", "model", "provider"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "llm_agent_proxy_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let rejected_requests = register_int_counter_vec!(
            "llm_agent_proxy_rejected_requests_total",
            "Requests rejected by validation",
            &["reason"]
        )
        .expect("Failed to register rejected_requests metric");

        let token_usage = register_int_counter_vec!(
            "llm_agent_proxy_tokens_total",
            "Total number of tokens used",
            &["model", "provider", "token_type"]
        )
        .expect("Failed to register token_usage metric");

        let provider_latency = register_histogram_vec!(
            "llm_agent_proxy_provider_latency_seconds",
            "Upstream model call latency in seconds",
            &["provider"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )
        .expect("Failed to register provider_latency metric");

        let tool_calls = register_int_counter_vec!(
            "llm_agent_proxy_tool_calls_total",
            "Tool invocations performed by agents",
            &["tool", "outcome"]
        )
        .expect("Failed to register tool_calls metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            rejected_requests,
            token_usage,
            provider_latency,
            tool_calls,
        }
    })
}

/// Get the global metrics instance, initializing it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = init_metrics();
        let metrics2 = get_metrics();
        assert!(std::ptr::eq(metrics, metrics2));
    }

    #[test]
    fn test_request_count_metric() {
        let metrics = init_metrics();
        let labels = ["POST", "/chat", "gpt-4o-mini-unique", "OpenAI", "200"];

        let initial = metrics.request_count.with_label_values(&labels).get();
        metrics.request_count.with_label_values(&labels).inc();
        let after = metrics.request_count.with_label_values(&labels).get();

        assert_eq!(after, initial + 1);
    }

    #[test]
    fn test_tool_calls_metric() {
        let metrics = init_metrics();
        let labels = ["tavily_search_results_json", "ok-unique"];

        let initial = metrics.tool_calls.with_label_values(&labels).get();
        metrics.tool_calls.with_label_values(&labels).inc_by(2);

        assert_eq!(
            metrics.tool_calls.with_label_values(&labels).get(),
            initial + 2
        );
    }

    #[test]
    fn test_provider_latency_metric() {
        let metrics = init_metrics();
        let histogram = metrics
            .provider_latency
            .with_label_values(&["latency-test-provider"]);

        histogram.observe(0.3);
        histogram.observe(1.2);

        assert_eq!(histogram.get_sample_count(), 2);
    }
}
