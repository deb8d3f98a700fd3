//! Pipeline orchestration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task;
use uuid::Uuid;

use kuvertki_core::names::validate_name_list;
use kuvertki_core::progress::{
    PCT_ASSEMBLING, PCT_CONVERTING, PCT_DONE, PCT_TEMPLATING, PCT_UNPACKING,
};

use crate::assemble::assemble_deck;
use crate::convert::convert_to_pdf;
use crate::error::PipelineError;
use crate::reporter::ProgressReporter;
use crate::template::{materialize_slides, unpack_template};

/// Everything one generation run needs.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Path to the template deck archive.
    pub template_path: PathBuf,
    /// Directory receiving assembled decks and final PDFs.
    pub output_dir: PathBuf,
    /// Root under which per-job working directories are created.
    pub work_root: PathBuf,
    /// Converter binary name or path.
    pub soffice_bin: String,
    /// Kill a hung converter after this long.
    pub convert_timeout: Duration,
}

/// Run the full pipeline for `names` and return the final PDF path.
///
/// Stages are strictly sequential; the first error aborts the run. The
/// working directory is removed on every exit path (the [`tempfile`] guard
/// drops when this function returns). The intermediate deck archive is
/// removed after a successful conversion; only the PDF persists.
///
/// Each run uses a fresh token for its output files, so concurrent runs
/// never collide in the shared output directory.
pub async fn generate_pdf(
    config: &GenerationConfig,
    names: Vec<String>,
    reporter: &ProgressReporter,
) -> Result<PathBuf, PipelineError> {
    validate_name_list(&names)?;

    let token = Uuid::new_v4().simple().to_string();

    reporter.update(PCT_UNPACKING, "Распаковка шаблона...");
    let template_path = config.template_path.clone();
    let work_root = config.work_root.clone();
    let workdir =
        task::spawn_blocking(move || unpack_template(&template_path, &work_root)).await??;

    let result = run_stages(config, &token, names, workdir.path(), reporter).await;
    if let Err(err) = &result {
        tracing::warn!(job_id = ?reporter.job_id(), error = %err, "generation failed");
    }
    // `workdir` drops here, removing the working directory whichever way
    // the stages ended.
    result
}

async fn run_stages(
    config: &GenerationConfig,
    token: &str,
    names: Vec<String>,
    workdir: &Path,
    reporter: &ProgressReporter,
) -> Result<PathBuf, PipelineError> {
    reporter.update(PCT_TEMPLATING, "Формирование слайдов...");
    let dir = workdir.to_path_buf();
    task::spawn_blocking(move || materialize_slides(&dir, &names)).await??;

    reporter.update(PCT_ASSEMBLING, "Сборка PPTX...");
    let deck_path = config.output_dir.join(format!("{token}.pptx"));
    let dir = workdir.to_path_buf();
    let deck = deck_path.clone();
    task::spawn_blocking(move || assemble_deck(&dir, &deck)).await??;

    reporter.update(PCT_CONVERTING, "Конвертация в PDF...");
    let pdf_path = convert_to_pdf(
        &config.soffice_bin,
        &deck_path,
        &config.output_dir,
        config.convert_timeout,
    )
    .await?;

    // Only the final PDF persists.
    let _ = tokio::fs::remove_file(&deck_path).await;

    reporter.record_file(&pdf_path);
    reporter.update(PCT_DONE, "Готово");
    tracing::info!(job_id = ?reporter.job_id(), pdf = %pdf_path.display(), "generation complete");
    Ok(pdf_path)
}
