//! Background extraction trigger and task polling.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use sanad::progress::ProgressExtra;
use sanad::{ExtractionJob, PipelineError, ProgressReporter, TaskRecord, TaskStatus};

use crate::api::error::ApiError;
use crate::api::requester::requester_from_headers;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub task_id: String,
    pub status: TaskStatus,
}

/// `POST /api/documents/:id/extract`: answers 202 at once; the pipeline
/// runs on a blocking worker and reports into the progress store.
pub async fn extract(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ExtractResponse>), ApiError> {
    let requester = requester_from_headers(&headers);
    let library = state.library.clone();
    let document = tokio::task::spawn_blocking(move || library.get(id, &requester)).await??;

    let path = state.library.file_path(&document);
    let size = tokio::fs::metadata(&path)
        .await
        .map_err(|e| {
            tracing::warn!(document_id = id, error = %e, "document file missing");
            ApiError::FileNotReadable("The document file could not be found".to_string())
        })?
        .len();
    if size > state.extraction_limit {
        return Err(PipelineError::file_too_large(size, state.extraction_limit).into());
    }

    let task_id = ProgressReporter::new_task_id();
    let record = state.reporter.start(&task_id, Some(document.id));

    let job = ExtractionJob::new(path, document.kind).with_document_id(document.id);
    let pipeline = state.pipeline.clone();
    let reporter = state.reporter.clone();
    let worker_task_id = task_id.clone();
    let worker = tokio::task::spawn_blocking({
        let reporter = reporter.clone();
        let task_id = worker_task_id.clone();
        move || {
            // Success and failure both land in the progress record.
            let _ = pipeline.run_task(&reporter, &task_id, &job);
        }
    });
    tokio::spawn(async move {
        if let Err(e) = worker.await {
            tracing::error!(task_id = %worker_task_id, error = %e, "extraction worker died");
            reporter.report(
                &worker_task_id,
                100,
                "Error: Extraction stopped unexpectedly",
                ProgressExtra::failed("Extraction stopped unexpectedly".to_string(), 0.0),
            );
        }
    });

    tracing::info!(document_id = id, task_id = %task_id, "extraction queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(ExtractResponse {
            task_id,
            status: record.status,
        }),
    ))
}

/// `GET /api/tasks/:task_id`
pub async fn status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskRecord>, ApiError> {
    Ok(Json(state.reporter.poll(&task_id)?))
}
