use crate::config::{Config, ExtractionConfig};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub extraction: ExtractionConfig,
    /// Candidates kept in the terminal progress record.
    pub preview_limit: usize,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            extraction: config.extraction.clone(),
            preview_limit: config.progress.preview_limit,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
