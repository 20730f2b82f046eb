use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document '{path}' is not readable: {reason}")]
    FileNotReadable { path: PathBuf, reason: String },

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),

    #[error("Failed to process DOCX: {0}")]
    DocxProcessing(String),

    #[error("Failed to process image: {0}")]
    ImageProcessing(String),

    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("No text could be extracted from the document")]
    ExtractionEmpty,

    #[error("Page {page} is out of range for a document with {total} pages")]
    PageOutOfRange { page: i64, total: usize },

    #[error("Failed to render page: {0}")]
    Render(String),
}

impl ProcessError {
    /// Whether the error means the file itself could not be opened or parsed.
    pub fn is_file_not_readable(&self) -> bool {
        matches!(
            self,
            ProcessError::ReadDocument { .. }
                | ProcessError::FileNotReadable { .. }
                | ProcessError::PdfProcessing(_)
                | ProcessError::DocxProcessing(_)
        )
    }

    /// Message that can leave the process: no file-system paths and no raw
    /// engine output.
    pub fn public_message(&self) -> String {
        match self {
            ProcessError::UnsupportedFormat(_)
            | ProcessError::ExtractionEmpty
            | ProcessError::PageOutOfRange { .. } => self.to_string(),
            ProcessError::OcrUnavailable(_) => "OCR engine unavailable".to_string(),
            e if e.is_file_not_readable() => "The document could not be read".to_string(),
            _ => "The document could not be processed".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Task '{0}' is unknown or has expired")]
    TaskExpiredOrUnknown(String),
}
