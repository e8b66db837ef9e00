//! Error types for loading, persistence and gateway plumbing
//!
//! The calculation engine itself is total: degenerate numeric input produces
//! sentinels or NaN, never an error. Everything here belongs to the I/O edges.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Stream error: {0}")]
    Stream(String),
}

impl EngineError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure reported by the chat/insights gateway.
///
/// All variants are retryable from the caller's point of view; none of them
/// leave engine state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI usage limit reached. Please add credits.")]
    CreditsExhausted,

    #[error("Gateway unavailable (status {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Gateway returned no predictions")]
    EmptyCompletion,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
}

impl GatewayError {
    /// Classify a non-success HTTP status and its body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => GatewayError::RateLimited,
            402 => GatewayError::CreditsExhausted,
            _ => {
                let message = serde_json::from_str::<ErrorBody>(body)
                    .map(|b| b.error)
                    .unwrap_or_else(|_| "Request failed".to_string());
                GatewayError::Unavailable { status, message }
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        true
    }
}
