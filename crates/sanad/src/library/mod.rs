//! Document library: upload, storage, visibility and metadata.

pub mod access;
pub mod storage;
pub mod upload;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, DocumentKind, UploadConfig};
use crate::db::document_repo::{self, DocumentRow};
use crate::db::{Database, DatabaseError};
use crate::processor::pdf::lopdf_page_count;

pub use access::{can_delete, can_view, Requester};
pub use storage::{DocumentStorage, StoredFile};
pub use upload::{validate_upload, UploadRequest, ValidatedUpload};

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("File is too large: {size} bytes exceeds the limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Document {0} not found")]
    NotFound(i64),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Storage error for path '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document record {id}: {reason}")]
    InvalidRecord { id: i64, reason: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// A library document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "file_type")]
    pub kind: DocumentKind,
    #[serde(skip)]
    pub file_path: String,
    pub original_filename: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
    pub page_count: Option<u32>,
    pub file_size: Option<u64>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = LibraryError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let timestamp = |value: &str| {
            DateTime::parse_from_rfc3339(value)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| LibraryError::InvalidRecord {
                    id,
                    reason: format!("bad timestamp '{}': {}", value, e),
                })
        };
        let uploaded_at = timestamp(&row.uploaded_at)?;
        let updated_at = timestamp(&row.updated_at)?;

        Ok(Self {
            id,
            kind: DocumentKind::parse(&row.kind),
            page_count: row.page_count.and_then(|n| u32::try_from(n).ok()),
            file_size: row.file_size.and_then(|n| u64::try_from(n).ok()),
            title: row.title,
            description: row.description,
            category: row.category,
            file_path: row.file_path,
            original_filename: row.original_filename,
            owner_id: row.owner_id,
            is_public: row.is_public,
            uploaded_at,
            updated_at,
        })
    }
}

/// Library service over the database and the on-disk blob store.
#[derive(Clone)]
pub struct Library {
    db: Database,
    root: PathBuf,
    upload: UploadConfig,
}

impl Library {
    pub fn new(db: Database, root: impl Into<PathBuf>, upload: UploadConfig) -> Self {
        Self {
            db,
            root: root.into(),
            upload,
        }
    }

    pub fn from_config(db: Database, config: &Config) -> Self {
        Self::new(db, &config.library_directory, config.upload.clone())
    }

    fn storage(&self) -> DocumentStorage {
        DocumentStorage::new(&self.root)
    }

    /// Validates, stores and records an upload, then fills in its metadata.
    pub fn upload(
        &self,
        requester: &Requester,
        request: UploadRequest<'_>,
    ) -> Result<Document, LibraryError> {
        let owner_id = requester.user_id.clone().ok_or_else(|| {
            LibraryError::PermissionDenied("Sign in to upload documents".to_string())
        })?;

        let validated = validate_upload(&request, &self.upload)?;
        let now = Utc::now();
        let stored = self
            .storage()
            .store(request.content, &validated.title, &validated.extension, now)?;

        let timestamp = now.to_rfc3339();
        let row = DocumentRow {
            id: 0,
            title: validated.title,
            description: non_empty(request.description),
            category: non_empty(request.category),
            kind: validated.kind.as_str().to_string(),
            file_path: stored.relative.clone(),
            original_filename: request.filename,
            owner_id: Some(owner_id),
            is_public: request.is_public,
            page_count: None,
            file_size: None,
            uploaded_at: timestamp.clone(),
            updated_at: timestamp,
        };

        let id = match document_repo::insert(&self.db, &row) {
            Ok(id) => id,
            Err(e) => {
                let _ = self.storage().remove(&stored.relative);
                return Err(e.into());
            }
        };

        tracing::info!(
            document_id = id,
            kind = %validated.kind,
            size = request.content.len(),
            "library.upload"
        );

        self.refresh_metadata(id)
    }

    /// Loads a document the requester is allowed to see.
    pub fn get(&self, id: i64, requester: &Requester) -> Result<Document, LibraryError> {
        let document = self.load(id)?;
        if !can_view(requester, &document) {
            return Err(LibraryError::PermissionDenied(
                "You do not have permission to view this document".to_string(),
            ));
        }
        Ok(document)
    }

    pub fn list(&self, requester: &Requester, limit: u64) -> Result<Vec<Document>, LibraryError> {
        document_repo::list_visible(
            &self.db,
            requester.user_id.as_deref(),
            requester.is_staff,
            limit,
        )?
        .into_iter()
        .map(Document::try_from)
        .collect()
    }

    /// Deletes the record and its file. Owner or staff only.
    pub fn delete(&self, id: i64, requester: &Requester) -> Result<(), LibraryError> {
        let document = self.load(id)?;
        if !can_delete(requester, &document) {
            return Err(LibraryError::PermissionDenied(
                "Only the owner or staff can delete this document".to_string(),
            ));
        }

        // File first: a failed removal leaves the record in place for a retry.
        self.storage().remove(&document.file_path)?;
        document_repo::delete(&self.db, id)?;

        tracing::info!(document_id = id, "library.delete");
        Ok(())
    }

    /// Re-reads file size from disk and, for PDFs, the page count.
    pub fn refresh_metadata(&self, id: i64) -> Result<Document, LibraryError> {
        let document = self.load(id)?;
        let path = self.file_path(&document);

        let file_size = std::fs::metadata(&path)
            .map(|m| m.len())
            .map_err(|e| LibraryError::Storage {
                path: path.clone(),
                source: e,
            })?;

        let page_count = match document.kind {
            DocumentKind::Pdf => match lopdf_page_count(&path) {
                Ok(count) => Some(count as i64),
                Err(e) => {
                    tracing::warn!(document_id = id, error = %e, "library.refresh_metadata: page count unavailable");
                    document.page_count.map(i64::from)
                }
            },
            _ => document.page_count.map(i64::from),
        };

        document_repo::update_metadata(
            &self.db,
            id,
            page_count,
            Some(file_size as i64),
            &Utc::now().to_rfc3339(),
        )?;

        self.load(id)
    }

    /// Absolute path of the document's file.
    pub fn file_path(&self, document: &Document) -> PathBuf {
        self.storage().resolve(&document.file_path)
    }

    fn load(&self, id: i64) -> Result<Document, LibraryError> {
        document_repo::find_by_id(&self.db, id)?
            .ok_or(LibraryError::NotFound(id))?
            .try_into()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
