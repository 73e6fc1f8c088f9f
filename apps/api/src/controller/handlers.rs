//! Axum route handlers for the optimization pipeline: the stateless rewrite
//! proxy plus the session endpoints driving the controller.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::controller::{SubmitError, MAX_JOB_DESCRIPTION_CHARS};
use crate::errors::{AppError, REWRITE_FAILURE_MESSAGE};
use crate::extract::{self, MAX_PDF_BYTES, PDF_MIME};
use crate::render;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionRequest {
    #[serde(default)]
    pub job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rewrite
///
/// The stateless trust-boundary proxy: validates both fields, forwards them
/// to the completion service with the fixed system instruction, and returns
/// `{content}`. Provider failures are masked behind a fixed message; the
/// credential and provider response never reach the client.
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Json(request): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, AppError> {
    if request.resume_text.is_empty() || request.job_description.is_empty() {
        return Err(AppError::Validation(
            "Missing resumeText or jobDescription".to_string(),
        ));
    }

    let content = state
        .rewriter
        .rewrite(&request.resume_text, &request.job_description)
        .await
        .map_err(|e| AppError::Rewrite(e.to_string()))?;

    Ok(Json(RewriteResponse { content }))
}

/// POST /api/v1/resume
///
/// Multipart PDF upload. Enforces the capability set (application/pdf,
/// ≤ 5 MB) before extraction, runs extraction off the async runtime, and
/// replaces the session's resume text wholesale.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart upload: {e}")))?
        .ok_or_else(|| AppError::Validation("Missing resume file".to_string()))?;

    if field.content_type() != Some(PDF_MIME) {
        return Err(AppError::Validation(
            "Resume must be a PDF file".to_string(),
        ));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
    if bytes.len() > MAX_PDF_BYTES {
        return Err(AppError::Validation(
            "Resume file exceeds the 5 MB limit".to_string(),
        ));
    }

    // PDF parsing is CPU-bound; keep it off the async runtime.
    let text = tokio::task::spawn_blocking(move || extract::extract_text(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?
        .map_err(|e| AppError::Extraction(e.to_string()))?;

    info!(chars = text.len(), "resume text extracted");
    state.controller.lock().await.set_resume_text(text.clone());

    Ok(Json(UploadResponse { resume_text: text }))
}

/// PUT /api/v1/job-description
pub async fn handle_set_job_description(
    State(state): State<AppState>,
    Json(request): Json<JobDescriptionRequest>,
) -> Result<StatusCode, AppError> {
    if request.job_description.chars().count() > MAX_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "Job description exceeds {MAX_JOB_DESCRIPTION_CHARS} characters"
        )));
    }

    state
        .controller
        .lock()
        .await
        .set_job_description(request.job_description);

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/optimize
///
/// Guarded submission through the controller: rejected while another
/// submission is pending or while either input is empty. The rewrite call
/// itself runs without the controller lock, so uploads and edits stay
/// responsive; its completion is applied back by sequence number.
pub async fn handle_optimize(
    State(state): State<AppState>,
) -> Result<Json<RewriteResponse>, AppError> {
    let (seq, resume_text, job_description) = {
        let mut controller = state.controller.lock().await;
        controller.begin_submission().map_err(|e| match e {
            SubmitError::AlreadyPending => AppError::SubmissionPending,
            other => AppError::Validation(other.to_string()),
        })?
    };

    let result = state.rewriter.rewrite(&resume_text, &job_description).await;

    let mut controller = state.controller.lock().await;
    match result {
        Ok(content) => {
            let applied = controller.complete_submission(seq, Ok(content.clone()));
            if !applied {
                warn!(seq, "discarded stale rewrite completion");
            }
            Ok(Json(RewriteResponse { content }))
        }
        Err(e) => {
            controller.complete_submission(seq, Err(REWRITE_FAILURE_MESSAGE.to_string()));
            Err(AppError::Rewrite(e.to_string()))
        }
    }
}

/// GET /api/v1/download
///
/// Renders the current optimized markdown into a fresh PDF on every call —
/// the artifact is never cached. Only actionable once a submission has
/// succeeded.
pub async fn handle_download(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let content = state
        .controller
        .lock()
        .await
        .content()
        .map(str::to_string)
        .ok_or(AppError::NoOptimizedResume)?;

    let pdf = tokio::task::spawn_blocking(move || render::render_pdf(&content))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?
        .map_err(|e| AppError::Render(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", render::OUTPUT_FILENAME),
            ),
        ],
        pdf,
    ))
}
