use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Closed error taxonomy for the simulation backend.
///
/// The HTTP mapping lives here and only here; core services return these
/// variants without ever inspecting them.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("NPC persona not found: {0}")]
    NpcNotFound(String),

    #[error("Invalid turn: {0}")]
    InvalidTurn(String),

    #[error("Context window exceeded: {0}")]
    ContextWindowExceeded(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("LLM service unavailable: {0}")]
    LlmUnavailable(String),

    #[error("Vector store unavailable: {0}")]
    VectorStoreUnavailable(String),

    #[error("Memory store unavailable: {0}")]
    MemoryStoreUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::ConversationNotFound(msg) => {
                tracing::warn!("Conversation not found: {}", msg);
                (StatusCode::NOT_FOUND, "ConversationNotFound", msg)
            }
            ApiError::NpcNotFound(msg) => {
                tracing::warn!("NPC not found: {}", msg);
                (StatusCode::NOT_FOUND, "NpcNotFound", msg)
            }
            ApiError::InvalidTurn(msg) => {
                tracing::warn!("Invalid turn: {}", msg);
                (StatusCode::BAD_REQUEST, "InvalidTurn", msg)
            }
            ApiError::ContextWindowExceeded(msg) => {
                tracing::warn!("Context window exceeded: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, "ContextWindowExceeded", msg)
            }
            ApiError::RateLimitExceeded(msg) => {
                tracing::warn!("Rate limit exceeded: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, "RateLimitExceeded", msg)
            }
            ApiError::LlmUnavailable(msg) => {
                tracing::error!("LLM unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "LlmUnavailable", msg)
            }
            ApiError::VectorStoreUnavailable(msg) => {
                tracing::error!("Vector store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "VectorStoreUnavailable", msg)
            }
            ApiError::MemoryStoreUnavailable(msg) => {
                tracing::error!("Memory store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "MemoryStoreUnavailable", msg)
            }
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError", msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
