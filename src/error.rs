// Client-side error types for calls to the risk management backend
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Backend rejection, classified by HTTP status with the backend's message
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity
    UnprocessableEntity {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),

    // Any other non-success status
    Other { status: u16, message: String },
}

impl ApiError {
    /// Classify a non-success response. The message comes from the body's
    /// `error` or `message` field when present.
    pub fn from_response(status: StatusCode, body: &Value) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        match status.as_u16() {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            422 => ApiError::UnprocessableEntity {
                message,
                field_errors: extract_field_errors(body),
            },
            429 => ApiError::TooManyRequests(message),
            500 => ApiError::InternalServerError(message),
            502 => ApiError::BadGateway(message),
            503 => ApiError::ServiceUnavailable(message),
            other => ApiError::Other { status: other, message },
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::UnprocessableEntity { .. } => 422,
            ApiError::TooManyRequests(_) => 429,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::Other { status, .. } => *status,
        }
    }

    /// Get the backend's message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::UnprocessableEntity { message, .. } => message,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
            ApiError::Other { message, .. } => message,
        }
    }

    /// Get error code for scripting against JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity { .. } => "UNPROCESSABLE_ENTITY",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::Other { .. } => "HTTP_ERROR",
        }
    }

    /// Whether signing in again could help
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::Forbidden(_))
    }
}

fn extract_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => ["error", "message"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Object(inner) => inner.get("message").and_then(|m| m.as_str()).map(str::to_string),
                _ => None,
            }),
        _ => None,
    }
}

fn extract_field_errors(body: &Value) -> HashMap<String, String> {
    body.get("field_errors")
        .or_else(|| body.get("errors"))
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .map(|(field, msg)| {
                    let text = msg.as_str().map(str::to_string).unwrap_or_else(|| msg.to_string());
                    (field.clone(), text)
                })
                .collect()
        })
        .unwrap_or_default()
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.status_code())
    }
}

impl std::error::Error for ApiError {}

/// Everything that can go wrong issuing a call through the client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ClientError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Api(e) => e.error_code(),
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::Url(_) => "INVALID_URL",
            ClientError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_error_field_is_used() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, &json!({"error": "Invalid credentials"}));
        assert_eq!(err, ApiError::Unauthorized("Invalid credentials".to_string()));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_message_field_and_fallback() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, &json!({"message": "Risk not found"}));
        assert_eq!(err.message(), "Risk not found");

        let err = ApiError::from_response(StatusCode::SERVICE_UNAVAILABLE, &Value::Null);
        assert_eq!(err.message(), "Service Unavailable");
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_unprocessable_collects_field_errors() {
        let err = ApiError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({"error": "Invalid risk", "errors": {"riskId": "is required"}}),
        );
        match err {
            ApiError::UnprocessableEntity { message, field_errors } => {
                assert_eq!(message, "Invalid risk");
                assert_eq!(field_errors.get("riskId").map(String::as_str), Some("is required"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_unlisted_status_is_preserved() {
        let err = ApiError::from_response(StatusCode::IM_A_TEAPOT, &json!("short and stout"));
        assert_eq!(err.status_code(), 418);
        assert_eq!(err.message(), "short and stout");
        assert_eq!(err.error_code(), "HTTP_ERROR");
    }
}
