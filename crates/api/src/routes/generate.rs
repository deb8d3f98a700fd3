//! Generation endpoints.
//!
//! Two flows over the same pipeline: `/generate` runs it inline and streams
//! the PDF back, `/start` + `/progress/{job_id}` + `/download/{job_id}` run
//! it in the background for callers that poll.

use std::path::Path;

use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

use kuvertki_core::names::{parse_name_list, validate_name_list};
use kuvertki_core::progress::JobProgress;
use kuvertki_pipeline::{generate_pdf, PipelineError, ProgressReporter};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The user-visible download name is Cyrillic, so the header carries both an
/// ASCII fallback and the RFC 5987 encoded form.
const PDF_CONTENT_DISPOSITION: &str = "attachment; filename=\"kuvertki.pdf\"; \
     filename*=UTF-8''%D0%BA%D1%83%D0%B2%D0%B5%D1%80%D1%82%D0%BA%D0%B8.pdf";

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    /// Comma-separated list of names, one slide each.
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub job_id: String,
}

fn parse_names(raw: &str) -> AppResult<Vec<String>> {
    let names = parse_name_list(raw);
    validate_name_list(&names).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(names)
}

async fn serve_pdf(path: &Path) -> AppResult<Response> {
    let bytes = tokio::fs::read(path).await.map_err(PipelineError::from)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, PDF_CONTENT_DISPOSITION),
        ],
        bytes,
    )
        .into_response())
}

/// POST /generate — run the pipeline inline and return the PDF.
async fn generate_sync(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> AppResult<Response> {
    let names = parse_names(&form.name)?;
    let pdf = generate_pdf(&state.config.generation(), names, &ProgressReporter::detached()).await?;
    serve_pdf(&pdf).await
}

/// POST /start — accept a background job and return its id immediately.
async fn start_job(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> AppResult<Json<StartResponse>> {
    let names = parse_names(&form.name)?;
    let job_id = state.jobs.try_start(names)?;
    Ok(Json(StartResponse { job_id }))
}

/// GET /progress/{job_id} — current milestone. Unknown ids yield the
/// not-found record rather than an HTTP error, so pollers get one shape.
async fn job_progress(
    State(state): State<AppState>,
    UrlPath(job_id): UrlPath<String>,
) -> Json<JobProgress> {
    Json(state.progress.get(&job_id))
}

/// GET /download/{job_id} — the finished PDF, or 404 while it is pending.
async fn download_job(
    State(state): State<AppState>,
    UrlPath(job_id): UrlPath<String>,
) -> AppResult<Response> {
    let record = state.progress.get(&job_id);
    match record.file {
        Some(path) if path.is_file() => serve_pdf(&path).await,
        _ => Err(AppError::FileNotReady),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate_sync))
        .route("/start", post(start_job))
        .route("/progress/{job_id}", get(job_progress))
        .route("/download/{job_id}", get(download_job))
}
