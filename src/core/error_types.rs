//! Shared constants for structured API errors.

pub const ERROR_TYPE_API: &str = "api_error";
pub const ERROR_TYPE_TIMEOUT: &str = "timeout_error";
pub const ERROR_TYPE_INVALID_REQUEST: &str = "invalid_request_error";
pub const ERROR_TYPE_UPSTREAM: &str = "upstream_error";
pub const ERROR_TYPE_AGENT: &str = "agent_error";
