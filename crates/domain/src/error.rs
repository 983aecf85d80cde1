use thiserror::Error;

/// Failure taxonomy for comment/reaction mutations. Every variant maps to a
/// single HTTP status at the edge; none is retried automatically.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("actor is banned from commenting")]
    Banned,

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl EngineError {
    pub fn denied(what: impl Into<String>) -> Self {
        EngineError::PermissionDenied(what.into())
    }

    pub fn missing(what: impl Into<String>) -> Self {
        EngineError::NotFound(what.into())
    }
}
