use thiserror::Error;

/// Errors surfaced by [`crate::service::MenuService`].
///
/// Collaborator failures are wrapped, never retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Recipe backend request failed: {0:#}")]
    Backend(anyhow::Error),

    #[error("Menu assistant request failed: {0:#}")]
    Assistant(anyhow::Error),

    #[error("Could not parse AI response: {0}")]
    AiParse(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Local storage error: {0:#}")]
    Storage(anyhow::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
