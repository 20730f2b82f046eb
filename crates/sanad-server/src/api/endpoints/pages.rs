//! Page images for the document viewer.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use sanad::{DocumentKind, ProcessError};

use crate::api::error::ApiError;
use crate::api::requester::requester_from_headers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub zoom: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    /// PNG as a `data:` URL.
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub current_page: usize,
    pub total_pages: usize,
    pub zoom: f32,
}

/// `GET /api/documents/:id/pages/:page?zoom=`: `page` is 0-based.
pub async fn render(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, page)): Path<(i64, i64)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>, ApiError> {
    let requester = requester_from_headers(&headers);
    let library = state.library.clone();
    let document = tokio::task::spawn_blocking(move || library.get(id, &requester)).await??;

    if document.kind != DocumentKind::Pdf {
        return Err(ProcessError::UnsupportedFormat(format!(
            "{} documents have no page images",
            document.kind
        ))
        .into());
    }

    let path = state.library.file_path(&document);
    let renderer = state.renderer.clone();
    let zoom = query.zoom.unwrap_or(1.0);
    let rendered =
        tokio::task::spawn_blocking(move || renderer.render_page(&path, page, zoom)).await??;

    Ok(Json(PageResponse {
        image: rendered.data_url(),
        width: rendered.width,
        height: rendered.height,
        current_page: rendered.current_page,
        total_pages: rendered.total_pages,
        zoom: rendered.zoom,
    }))
}
