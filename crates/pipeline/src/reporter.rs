//! Milestone reporting into a progress store.

use std::path::Path;
use std::sync::Arc;

use kuvertki_core::progress::{ProgressStore, PCT_FAILED};

/// Reports pipeline milestones for one job.
///
/// The synchronous endpoint runs the pipeline without a job id; it uses a
/// detached reporter and every update is a no-op. Asynchronous jobs attach
/// a store and their token.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Option<(Arc<dyn ProgressStore>, String)>,
}

impl ProgressReporter {
    /// Reporter bound to a job token in `store`.
    pub fn attached(store: Arc<dyn ProgressStore>, job_id: String) -> Self {
        Self {
            inner: Some((store, job_id)),
        }
    }

    /// Reporter that drops all updates.
    pub fn detached() -> Self {
        Self { inner: None }
    }

    /// The job token, if this reporter is attached.
    pub fn job_id(&self) -> Option<&str> {
        self.inner.as_ref().map(|(_, id)| id.as_str())
    }

    /// Record a milestone.
    pub fn update(&self, percent: i32, message: &str) {
        if let Some((store, job_id)) = &self.inner {
            store.set_progress(job_id, percent, message);
        }
    }

    /// Record the final output file.
    pub fn record_file(&self, file: &Path) {
        if let Some((store, job_id)) = &self.inner {
            store.set_file(job_id, file);
        }
    }

    /// Mark the job as failed with a user-facing message.
    pub fn fail(&self, err: &dyn std::fmt::Display) {
        self.update(PCT_FAILED, &format!("Ошибка: {err}"));
    }
}
