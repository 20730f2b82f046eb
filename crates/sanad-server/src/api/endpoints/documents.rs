//! Library endpoints: upload, list, detail, delete.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use sanad::{Document, LibraryError, UploadRequest};

use crate::api::error::ApiError;
use crate::api::requester::requester_from_headers;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: u64 = 50;
const MAX_LIST_LIMIT: u64 = 200;

/// Multipart fields collected before validation.
#[derive(Debug)]
struct UploadForm {
    title: String,
    description: Option<String>,
    category: Option<String>,
    is_public: bool,
    filename: String,
    content: Vec<u8>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            category: None,
            is_public: true,
            filename: String::new(),
            content: Vec::new(),
        }
    }
}

impl UploadForm {
    fn request(&self) -> UploadRequest<'_> {
        UploadRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            is_public: self.is_public,
            filename: self.filename.clone(),
            content: &self.content,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

/// `POST /api/documents`: multipart `file`, `title`, `description`,
/// `category`, `is_public`.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let requester = requester_from_headers(&headers);
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                form.filename = field.file_name().unwrap_or("").to_string();
                form.content = field.bytes().await?.to_vec();
            }
            "title" => form.title = field.text().await?,
            "description" => form.description = Some(field.text().await?),
            "category" => form.category = Some(field.text().await?),
            "is_public" => form.is_public = parse_flag(&field.text().await?),
            _ => {}
        }
    }

    let size = form.content.len() as u64;
    if size > state.upload_limit {
        return Err(LibraryError::FileTooLarge {
            size,
            limit: state.upload_limit,
        }
        .into());
    }

    let library = state.library.clone();
    let document =
        tokio::task::spawn_blocking(move || library.upload(&requester, form.request())).await??;

    Ok((StatusCode::CREATED, Json(document)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

/// `GET /api/documents`: documents the caller may see, newest first.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let requester = requester_from_headers(&headers);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let library = state.library.clone();
    let documents =
        tokio::task::spawn_blocking(move || library.list(&requester, limit)).await??;
    Ok(Json(documents))
}

/// `GET /api/documents/:id`
pub async fn detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Document>, ApiError> {
    let requester = requester_from_headers(&headers);
    let library = state.library.clone();
    let document = tokio::task::spawn_blocking(move || library.get(id, &requester)).await??;
    Ok(Json(document))
}

/// `DELETE /api/documents/:id`: owner or staff.
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let requester = requester_from_headers(&headers);
    let library = state.library.clone();
    tokio::task::spawn_blocking(move || library.delete(id, &requester)).await??;
    Ok(StatusCode::NO_CONTENT)
}
