use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tooling::{ConneryError, ToolError, ToolboxError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Action runner error: {message}")]
    ActionRunnerError { message: String, retryable: bool },

    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    #[error("Tool execution error: {0}")]
    ToolError(ToolError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            ApiError::UnknownTool(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::ConfigError(_) => 500,
            ApiError::ActionRunnerError { .. } => 502,
            ApiError::VectorStoreError(_) => 500,
            ApiError::ToolError(e) if e.recoverable => 422,
            ApiError::ToolError(_) => 500,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::UnknownTool(_) => false,
            ApiError::ValidationError(_) => false,
            ApiError::ConfigError(_) => false,
            ApiError::ActionRunnerError { retryable, .. } => *retryable,
            ApiError::VectorStoreError(_) => true,
            ApiError::ToolError(e) => e.recoverable,
            ApiError::Internal(_) => false,
        }
    }
}

impl From<ToolboxError> for ApiError {
    fn from(error: ToolboxError) -> Self {
        match error {
            ToolboxError::UnknownTool(label) => ApiError::UnknownTool(label),
            ToolboxError::MissingParameter(_) => ApiError::ValidationError(error.to_string()),
            ToolboxError::MissingEnv(_) | ToolboxError::DuplicateTool(_) => {
                ApiError::ConfigError(error.to_string())
            }
            // Only transport failures are transient; a rejected key or failed action is not.
            ToolboxError::ActionRunner(e) => ApiError::ActionRunnerError {
                retryable: matches!(e, ConneryError::Http(_)),
                message: e.to_string(),
            },
            ToolboxError::VectorStore(e) => ApiError::VectorStoreError(e.to_string()),
            ToolboxError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(error: ToolError) -> Self {
        ApiError::ToolError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }
        let body = Json(json!({
            "error": self.to_string(),
            "retryable": self.is_retryable()
        }));
        (status, body).into_response()
    }
}
