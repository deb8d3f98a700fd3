//! Pipeline error type.

use std::path::PathBuf;
use std::time::Duration;

use kuvertki_core::CoreError;

/// Errors produced while turning a name list into a PDF.
///
/// Every variant is fatal for the job that hit it; there is no partial
/// recovery and no retry.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The template deck archive is not on disk.
    #[error("template archive not found: {0}")]
    TemplateMissing(PathBuf),

    /// An expected internal part of the unpacked template is absent.
    #[error("malformed template: missing part {0}")]
    MissingPart(String),

    /// A domain-level error from `kuvertki-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The external converter exited non-zero. Not retried.
    #[error("PDF conversion failed (exit code {exit_code:?}): {stderr}")]
    ConversionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The external converter hung past the configured deadline and was
    /// killed.
    #[error("PDF conversion timed out after {0:?}")]
    ConversionTimeout(Duration),

    /// An I/O error from the filesystem or the converter spawn.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The deck archive could not be read or written.
    #[error("deck archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A blocking stage task failed to complete.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
