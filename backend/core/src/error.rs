use thiserror::Error;

/// Top-level error type for the inspection and report pipeline.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Caller input is unusable; retrying without new input will not help.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("image analysis provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InspectError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wrap a collaborator failure as a storage error, keeping the cause chain.
    pub fn storage(context: &str, err: anyhow::Error) -> Self {
        Self::Storage(format!("{context}: {err:#}"))
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::Storage(_) | Self::Internal(_) | Self::Other(_)
        )
    }
}
