//! Background job execution for the asynchronous generation flow.
//!
//! Each accepted job gets a fresh id, an immediate progress record, and a
//! spawned task that drives the pipeline while holding a semaphore permit.
//! The permit count bounds how many conversions run at once; when no permit
//! is free the job is rejected up front instead of queueing silently.

use std::sync::Arc;

use tokio::sync::Semaphore;
use uuid::Uuid;

use kuvertki_core::progress::{ProgressStore, PCT_STARTED};
use kuvertki_pipeline::{generate_pdf, GenerationConfig, ProgressReporter};

use crate::error::{AppError, AppResult};

pub struct JobRunner {
    semaphore: Arc<Semaphore>,
    store: Arc<dyn ProgressStore>,
    generation: GenerationConfig,
}

impl JobRunner {
    pub fn new(
        max_concurrent: usize,
        store: Arc<dyn ProgressStore>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            store,
            generation,
        }
    }

    /// Accept a job if a permit is free, returning its id. The pipeline runs
    /// in a spawned task; callers observe it through the progress store.
    pub fn try_start(&self, names: Vec<String>) -> AppResult<String> {
        let permit = Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .map_err(|_| AppError::Busy("Сервер занят, попробуйте позже".into()))?;

        let job_id = Uuid::new_v4().simple().to_string();
        self.store.set_progress(&job_id, PCT_STARTED, "Старт");

        let reporter = ProgressReporter::attached(Arc::clone(&self.store), job_id.clone());
        let config = self.generation.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            let _permit = permit;
            match generate_pdf(&config, names, &reporter).await {
                Ok(pdf) => {
                    tracing::info!(job_id = %id, pdf = %pdf.display(), "job finished");
                }
                Err(err) => {
                    tracing::error!(job_id = %id, error = %err, "job failed");
                    reporter.fail(&err);
                }
            }
        });

        Ok(job_id)
    }
}
