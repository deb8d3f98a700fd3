//! External PDF conversion.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use crate::error::PipelineError;

/// Convert `deck` to a PDF in `output_dir` with a headless converter run.
///
/// The caller blocks until the child exits. A non-zero exit is
/// [`PipelineError::ConversionFailed`] and is not retried. A run that
/// exceeds `timeout` is killed and reported as
/// [`PipelineError::ConversionTimeout`].
///
/// On success the output path is the deck path with its extension replaced
/// by `pdf` (the converter's naming convention).
pub async fn convert_to_pdf(
    soffice_bin: &str,
    deck: &Path,
    output_dir: &Path,
    timeout: Duration,
) -> Result<PathBuf, PipelineError> {
    let mut command = Command::new(soffice_bin);
    command
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(output_dir)
        .arg(deck)
        // Dropping the future on timeout kills the child.
        .kill_on_drop(true);

    tracing::debug!(bin = soffice_bin, deck = %deck.display(), "invoking PDF converter");

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| PipelineError::ConversionTimeout(timeout))??;

    if !output.status.success() {
        return Err(PipelineError::ConversionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(deck.with_extension("pdf"))
}
