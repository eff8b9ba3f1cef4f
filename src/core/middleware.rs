//! HTTP middleware for request tracking and metrics.
//!
//! Handlers attach [`ModelName`] and [`ProviderName`] extensions to their
//! responses; the metrics middleware reads them back to label the request.

use crate::core::logging::{generate_request_id, REQUEST_ID};
use crate::core::metrics::get_metrics;
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Header used to propagate request ids to and from clients.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Extension type for storing model name in response
#[derive(Clone, Debug)]
pub struct ModelName(pub String);

/// Extension type for storing provider name in response
#[derive(Clone, Debug)]
pub struct ProviderName(pub String);

/// Assign a request id to every request.
///
/// An incoming `x-request-id` header is reused when present, otherwise a new
/// UUID is generated. The id is available through
/// [`crate::core::logging::get_request_id`] for the whole request and is
/// echoed back in the response headers.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(|v| v.to_string())
        .unwrap_or_else(generate_request_id);

    let mut response = REQUEST_ID.scope(request_id.clone(), next.run(request)).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }

    response
}

/// Middleware for tracking request metrics.
pub struct MetricsMiddleware;

impl MetricsMiddleware {
    /// Track metrics for incoming requests.
    ///
    /// Increments the active request gauge, measures duration and records
    /// the request count by status code. Requests that never reached a
    /// provider are labelled `unknown`.
    pub async fn track_metrics(request: Request, next: Next) -> Response {
        let endpoint = request.uri().path().to_string();
        let method = request.method().to_string();

        // Skip metrics endpoint itself to avoid recursion
        if endpoint == "/metrics" {
            return next.run(request).await;
        }

        let metrics = get_metrics();

        metrics
            .active_requests
            .with_label_values(&[&endpoint])
            .inc();

        let start = Instant::now();
        let response = next.run(request).await;
        let duration = start.elapsed().as_secs_f64();
        let status_code = response.status().as_u16().to_string();

        let model = response
            .extensions()
            .get::<ModelName>()
            .map(|m| m.0.as_str())
            .unwrap_or("unknown");
        let provider = response
            .extensions()
            .get::<ProviderName>()
            .map(|p| p.0.as_str())
            .unwrap_or("unknown");

        metrics
            .request_count
            .with_label_values(&[&method, &endpoint, model, provider, &status_code])
            .inc();

        metrics
            .request_duration
            .with_label_values(&[&method, &endpoint, model, provider])
            .observe(duration);

        metrics
            .active_requests
            .with_label_values(&[&endpoint])
            .dec();

        tracing::info!(
            method = %method,
            endpoint = %endpoint,
            model = %model,
            provider = %provider,
            status = %status_code,
            duration_secs = duration,
            "Request completed"
        );

        response
    }
}
