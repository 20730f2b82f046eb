//! HTTP routes, all nested under `/api`.
//!
//! Path params use `:param` syntax (axum 0.7).

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints::{documents, extraction, health, pages};
use crate::state::AppState;

/// Room for multipart boundaries and the text fields around the file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn api_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.upload_limit)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api = Router::new()
        .route("/health", get(health::check))
        .route("/documents", get(documents::list).post(documents::upload))
        .route(
            "/documents/:id",
            get(documents::detail).delete(documents::remove),
        )
        .route("/documents/:id/extract", post(extraction::extract))
        .route("/documents/:id/pages/:page", get(pages::render))
        .route("/tasks/:task_id", get(extraction::status))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new().nest("/api", api)
}
