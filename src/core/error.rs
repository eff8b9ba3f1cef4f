//! Error types and handling for the agent proxy.
//!
//! This module provides a unified error type [`AppError`] that wraps the error
//! sources of the agent pipeline and implements HTTP response conversion.
//! Request validation failures are not errors here: the dispatcher reports
//! them as a regular payload.

use crate::core::error_types::{
    ERROR_TYPE_AGENT, ERROR_TYPE_API, ERROR_TYPE_INVALID_REQUEST, ERROR_TYPE_TIMEOUT,
    ERROR_TYPE_UPSTREAM,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request errors from the reqwest client
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client provided invalid data
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A provider was invoked without its API key configured
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// Upstream provider answered with a non-success status
    #[error("Upstream error from {provider} (HTTP {status}): {message}")]
    Upstream {
        provider: String,
        status: u16,
        message: String,
    },

    /// The agent run finished without any assistant-authored message
    #[error("Agent produced no assistant response")]
    NoAssistantMessage,

    /// The agent kept requesting tools past the configured step budget
    #[error("Agent stopped after {0} model calls without a final answer")]
    StepLimitExceeded(usize),

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            // Non-2xx upstream answers become `Upstream`, so only transport failures land here
            AppError::Request(e) if e.is_timeout() => (StatusCode::GATEWAY_TIMEOUT, ERROR_TYPE_TIMEOUT),
            AppError::Request(_) => (StatusCode::BAD_GATEWAY, ERROR_TYPE_UPSTREAM),
            AppError::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, ERROR_TYPE_API),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, ERROR_TYPE_INVALID_REQUEST),
            AppError::MissingCredential(_) => (StatusCode::INTERNAL_SERVER_ERROR, ERROR_TYPE_API),
            AppError::Upstream { .. } => (StatusCode::BAD_GATEWAY, ERROR_TYPE_UPSTREAM),
            AppError::NoAssistantMessage => (StatusCode::BAD_GATEWAY, ERROR_TYPE_AGENT),
            AppError::StepLimitExceeded(_) => (StatusCode::INTERNAL_SERVER_ERROR, ERROR_TYPE_AGENT),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ERROR_TYPE_API),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let error_message = match &self {
            AppError::Request(e) if e.is_timeout() => "Gateway timeout".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(
                request_id = %crate::core::logging::get_request_id(),
                status = status.as_u16(),
                error = %error_message,
                "Request failed"
            );
        }

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16()
            }
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = AppError::NoAssistantMessage;
        assert_eq!(err.to_string(), "Agent produced no assistant response");

        let err = AppError::Internal("test error".to_string());
        assert_eq!(err.to_string(), "Internal server error: test error");

        let err = AppError::MissingCredential("GROQ_API_KEY");
        assert_eq!(err.to_string(), "Missing credential: GROQ_API_KEY is not set");

        let err = AppError::StepLimitExceeded(25);
        assert_eq!(
            err.to_string(),
            "Agent stopped after 25 model calls without a final answer"
        );
    }

    #[test]
    fn test_upstream_display() {
        let err = AppError::Upstream {
            provider: "OpenAI".to_string(),
            status: 401,
            message: "invalid api key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Upstream error from OpenAI (HTTP 401): invalid api key"
        );
    }

    #[tokio::test]
    async fn test_no_assistant_message_response() {
        let response = AppError::NoAssistantMessage.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "agent_error");
        assert_eq!(json["error"]["code"], 502);
        assert_eq!(
            json["error"]["message"],
            "Agent produced no assistant response"
        );
    }

    #[test]
    fn test_upstream_response() {
        let err = AppError::Upstream {
            provider: "Groq".to_string(),
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_connect_failure_response() {
        // Nothing listens on port 1, so the request fails before any HTTP status exists
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        assert!(err.status().is_none());

        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "upstream_error");
        assert_eq!(json["error"]["code"], 502);
    }

    #[test]
    fn test_bad_request_response() {
        let response = AppError::BadRequest("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_credential_response() {
        let response = AppError::MissingCredential("OPENAI_API_KEY").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Serialization(_)));
    }
}
