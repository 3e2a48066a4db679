use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Field name to messages, e.g. `{"systolic": ["Systolic must be greater than Zero"]}`
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let fields: serde_json::Map<String, serde_json::Value> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => serde_json::Value::String(msg.to_string()),
                    None => serde_json::Value::String(format!("Invalid {}", field)),
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(messages))
        })
        .collect();

    serde_json::Value::Object(fields)
}
