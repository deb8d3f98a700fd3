//! Domain-level error type shared across the workspace.

/// Errors produced by pure domain logic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The template deck is structurally broken: an expected XML block,
    /// run, or placeholder is absent.
    #[error("malformed template: {0}")]
    MalformedTemplate(String),

    /// Invalid caller-supplied input (e.g. an empty name list).
    #[error("validation error: {0}")]
    Validation(String),
}
