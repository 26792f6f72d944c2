use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Request-path error taxonomy. Every variant is caught at the handler
/// boundary and becomes a response; none of them may take the process down.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Decodable body with a missing or empty required field.
    #[error("{0}")]
    InvalidInput(String),

    /// Undecodable request body. Existing clients expect 500 here rather
    /// than 400; kept as its own variant so the status could be revisited
    /// without touching call sites.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Engine or file-write failure while serving a request.
    #[error("{0}")]
    Synthesis(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedBody(_) | ApiError::Synthesis(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!("request failed: {message}");
        }

        // Error bodies are plain text, not structured JSON.
        (status, message).into_response()
    }
}
