//! Upload validation.

use std::path::Path;

use crate::config::{DocumentKind, UploadConfig};

use super::LibraryError;

/// A document submitted for upload.
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_public: bool,
    /// Client-supplied file name; only its extension is trusted.
    pub filename: String,
    pub content: &'a [u8],
}

/// Upload accepted by [`validate_upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub title: String,
    pub extension: String,
    pub kind: DocumentKind,
}

pub fn validate_upload(
    request: &UploadRequest<'_>,
    config: &UploadConfig,
) -> Result<ValidatedUpload, LibraryError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(LibraryError::UploadRejected("Title is required".to_string()));
    }

    let size = request.content.len() as u64;
    if size == 0 {
        return Err(LibraryError::UploadRejected(
            "Please choose a file to upload".to_string(),
        ));
    }
    if size > config.max_size_bytes {
        return Err(LibraryError::FileTooLarge {
            size,
            limit: config.max_size_bytes,
        });
    }

    let extension = file_extension(&request.filename).ok_or_else(|| rejected_type(config))?;
    if !config
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return Err(rejected_type(config));
    }

    Ok(ValidatedUpload {
        title: title.to_string(),
        kind: DocumentKind::from_extension(&extension),
        extension,
    })
}

/// Lowercased extension of a client file name, ignoring any directory part.
pub fn file_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

fn rejected_type(config: &UploadConfig) -> LibraryError {
    let allowed: Vec<String> = config
        .allowed_extensions
        .iter()
        .map(|e| format!(".{}", e))
        .collect();
    LibraryError::UploadRejected(format!(
        "Unsupported file type. Please upload one of: {}",
        allowed.join(", ")
    ))
}
