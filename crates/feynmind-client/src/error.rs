use feynmind_core::QuizError;
use thiserror::Error;

/// Unified error type for backend calls.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx response, already reduced to its user-facing text
    /// (`Failed: {detail|body|status}`).
    #[error("{0}")]
    Backend(String),

    /// Transport failure or undecodable success body.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend returned a quiz that violates its own contract.
    #[error("backend contract violation: {0}")]
    Contract(#[from] QuizError),
}

pub type ApiResult<T> = Result<T, ApiError>;
