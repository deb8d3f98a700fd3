//! Job progress records and the progress store abstraction.
//!
//! One generation job is tracked by an opaque token. The record carries a
//! percentage (`-1` = failed, `0..=99` = in progress, `100` = done), a
//! human-readable message, and the output file path once the job completes.
//!
//! The store is injectable behind [`ProgressStore`] so handlers and the
//! pipeline can be exercised in tests without a live process, and so a
//! persistent backing store could be swapped in later.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// A job that failed at any stage.
pub const PCT_FAILED: i32 = -1;
/// A job that was accepted and queued.
pub const PCT_STARTED: i32 = 1;
/// Unpacking the template archive.
pub const PCT_UNPACKING: i32 = 5;
/// Writing per-name slides and rewriting deck manifests.
pub const PCT_TEMPLATING: i32 = 30;
/// Repacking the working directory into a deck archive.
pub const PCT_ASSEMBLING: i32 = 55;
/// Waiting on the external PDF converter.
pub const PCT_CONVERTING: i32 = 80;
/// Finished; the output file is recorded.
pub const PCT_DONE: i32 = 100;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Snapshot of a job's progress, serialized as `{"p", "msg", "file"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Progress percentage. `-1` signals failure, `100` completion.
    #[serde(rename = "p")]
    pub percent: i32,
    /// Human-readable status message.
    #[serde(rename = "msg")]
    pub message: String,
    /// Output file path, populated only after full success.
    #[serde(rename = "file")]
    pub file: Option<PathBuf>,
}

impl JobProgress {
    /// The record returned for an unknown job token.
    pub fn not_found() -> Self {
        Self {
            percent: PCT_FAILED,
            message: "Не найдено".to_string(),
            file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Thread-safe mapping from job token to progress record.
///
/// Writes for a given job only ever come from the one task executing that
/// job; reads are idempotent snapshots. Implementations must not block on
/// I/O inside these calls.
pub trait ProgressStore: Send + Sync {
    /// Upsert the percentage and message for a job, preserving any
    /// previously recorded output file.
    fn set_progress(&self, job_id: &str, percent: i32, message: &str);

    /// Attach the output file to a job without touching percent/message.
    fn set_file(&self, job_id: &str, file: &Path);

    /// Snapshot the current record, or [`JobProgress::not_found`] if the
    /// token is unknown.
    fn get(&self, job_id: &str) -> JobProgress;
}

/// Process-lifetime in-memory store guarded by a single mutex.
///
/// Records are never removed; the table grows for the lifetime of the
/// process. That is an accepted non-goal of the service.
#[derive(Default)]
pub struct InMemoryProgressStore {
    jobs: Mutex<HashMap<String, JobProgress>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn set_progress(&self, job_id: &str, percent: i32, message: &str) {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let file = jobs.get(job_id).and_then(|j| j.file.clone());
        jobs.insert(
            job_id.to_string(),
            JobProgress {
                percent,
                message: message.to_string(),
                file,
            },
        );
    }

    fn set_file(&self, job_id: &str, file: &Path) {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        jobs.entry(job_id.to_string())
            .or_insert_with(JobProgress::not_found)
            .file = Some(file.to_path_buf());
    }

    fn get(&self, job_id: &str) -> JobProgress {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job_id)
            .cloned()
            .unwrap_or_else(JobProgress::not_found)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
