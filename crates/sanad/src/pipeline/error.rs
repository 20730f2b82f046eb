use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Document processing failed: {0}")]
    Processing(#[from] crate::error::ProcessError),

    #[error("File too large: {size_mb:.2}MB. Maximum allowed size is {limit_mb:.0}MB.")]
    FileTooLarge { size_mb: f64, limit_mb: f64 },

    #[error("Extraction stopped unexpectedly: {0}")]
    Interrupted(String),
}

impl PipelineError {
    pub fn file_too_large(size: u64, limit: u64) -> Self {
        Self::FileTooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            limit_mb: limit as f64 / (1024.0 * 1024.0),
        }
    }

    /// Text stored in task records and returned to clients.
    pub fn public_message(&self) -> String {
        match self {
            PipelineError::Processing(e) => e.public_message(),
            PipelineError::FileTooLarge { .. } => self.to_string(),
            PipelineError::Interrupted(_) => "Extraction stopped unexpectedly".to_string(),
        }
    }
}
