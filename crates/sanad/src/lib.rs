pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod sanitize;
pub mod segmenter;

pub use config::{load_config, load_config_from_env, Config, DocumentKind};
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, ProcessError, ProgressError};
pub use library::{Document, Library, LibraryError, Requester, UploadRequest};
pub use pipeline::{ExtractionJob, ExtractionOutcome, Pipeline, PipelineConfig, PipelineError};
pub use processor::{
    DocumentSource, ExtractOptions, PageRange, PageRenderer, RenderedPage, TextExtractor,
};
pub use progress::{ProgressReporter, ProgressSink, TaskRecord, TaskStatus};
pub use segmenter::{HadithCandidate, HadithSegmenter};
