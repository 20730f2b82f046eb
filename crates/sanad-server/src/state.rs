//! Shared state handed to every route.

use std::sync::Arc;

use sanad::processor::{PageRasterizer, PopplerRasterizer};
use sanad::{
    Config, Database, Library, PageRenderer, Pipeline, PipelineConfig, ProgressReporter,
    TextExtractor,
};

#[derive(Clone)]
pub struct AppState {
    pub library: Library,
    pub pipeline: Arc<Pipeline>,
    pub reporter: ProgressReporter,
    pub renderer: Arc<PageRenderer>,
    /// Largest file the extraction endpoint accepts, in bytes.
    pub extraction_limit: u64,
    /// Largest upload the multipart endpoint accepts, in bytes.
    pub upload_limit: u64,
}

impl AppState {
    /// Production wiring: tesseract and poppler as configured.
    pub fn from_config(db: Database, config: &Config) -> Self {
        Self::with_components(
            db,
            config,
            TextExtractor::from_config(config),
            Arc::new(PopplerRasterizer::new()),
        )
    }

    pub fn with_components(
        db: Database,
        config: &Config,
        extractor: TextExtractor,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Self {
        Self {
            library: Library::from_config(db, config),
            pipeline: Arc::new(Pipeline::new(
                Arc::new(PipelineConfig::from_config(config)),
                extractor,
            )),
            reporter: ProgressReporter::in_memory(&config.progress),
            renderer: Arc::new(PageRenderer::new(rasterizer, config.render.clone())),
            extraction_limit: config.extraction.max_file_size_bytes,
            upload_limit: config.upload.max_size_bytes,
        }
    }
}
