use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, info_span, warn};

use crate::config::DocumentKind;
use crate::processor::{scaled_percent, DocumentSource, ExtractOptions, TextExtractor};
use crate::progress::{ProgressExtra, ProgressReporter, ProgressSink};
use crate::sanitize;
use crate::segmenter::{HadithCandidate, HadithSegmenter};

use super::config::PipelineConfig;
use super::error::PipelineError;

/// A stored document queued for extraction.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub document_id: Option<i64>,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl ExtractionJob {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        Self {
            document_id: None,
            path: path.into(),
            kind,
        }
    }

    pub fn with_document_id(mut self, document_id: i64) -> Self {
        self.document_id = Some(document_id);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub hadiths: Vec<HadithCandidate>,
    pub total_hadiths: usize,
    pub text_length: usize,
}

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    extractor: TextExtractor,
    segmenter: HadithSegmenter,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, extractor: TextExtractor) -> Self {
        Self {
            config,
            extractor,
            segmenter: HadithSegmenter::new(),
        }
    }

    /// Extracts text from one document and segments it into hadith candidates.
    pub fn run(
        &self,
        job: &ExtractionJob,
        sink: &dyn ProgressSink,
    ) -> Result<ExtractionOutcome, PipelineError> {
        let _pipeline_span = info_span!("pipeline",
            task_id = tracing::field::Empty,
            document_id = ?job.document_id,
            filename = %sanitize::redact_path(&job.path),
            kind = %job.kind,
        )
        .entered();

        self.execute(job, sink)
    }

    /// Runs `job` as task `task_id`, leaving a terminal record in the reporter.
    pub fn run_task(
        &self,
        reporter: &ProgressReporter,
        task_id: &str,
        job: &ExtractionJob,
    ) -> Result<ExtractionOutcome, PipelineError> {
        let _pipeline_span = info_span!("pipeline",
            task_id = %task_id,
            document_id = ?job.document_id,
            filename = %sanitize::redact_path(&job.path),
            kind = %job.kind,
        )
        .entered();

        let started = Instant::now();
        let tracker = reporter.tracker(task_id);
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.execute(job, &tracker)))
            .unwrap_or_else(|payload| {
                let detail = panic_detail(payload.as_ref());
                error!(panic = %detail, "Extraction worker panicked");
                Err(PipelineError::Interrupted(detail))
            });
        let duration = started.elapsed().as_secs_f64();

        match &result {
            Ok(outcome) => {
                let preview: Vec<HadithCandidate> = outcome
                    .hadiths
                    .iter()
                    .take(self.config.preview_limit)
                    .cloned()
                    .collect();
                info!(
                    total_hadiths = outcome.total_hadiths,
                    duration_secs = duration,
                    "Extraction completed"
                );
                reporter.report(
                    task_id,
                    100,
                    &format!("Successfully extracted {} hadiths", outcome.total_hadiths),
                    ProgressExtra::completed(preview, outcome.total_hadiths, duration),
                );
            }
            Err(e) => {
                warn!(error = %e, duration_secs = duration, "Extraction failed");
                let public = e.public_message();
                reporter.report(
                    task_id,
                    100,
                    &format!("Error: {}", public),
                    ProgressExtra::failed(public.clone(), duration),
                );
            }
        }

        result
    }

    fn execute(
        &self,
        job: &ExtractionJob,
        sink: &dyn ProgressSink,
    ) -> Result<ExtractionOutcome, PipelineError> {
        sink.on_progress(5, "Analyzing document...", ProgressExtra::none());

        let file_size = std::fs::metadata(&job.path)
            .map_err(|e| crate::error::ProcessError::FileNotReadable {
                path: job.path.clone(),
                reason: e.to_string(),
            })?
            .len();

        let limits = &self.config.extraction;
        if file_size > limits.max_file_size_bytes {
            return Err(PipelineError::file_too_large(
                file_size,
                limits.max_file_size_bytes,
            ));
        }

        let options = ExtractOptions {
            chunk_size: limits.chunk_size_for(file_size),
            ..ExtractOptions::default()
        };

        let text = {
            let _step = info_span!("extract_text").entered();

            if job.kind == DocumentKind::Pdf {
                sink.on_progress(10, "Preparing PDF for extraction...", ProgressExtra::none());
                if file_size > limits.large_file_threshold_bytes {
                    warn!(
                        chunk_size = options.chunk_size,
                        "Large PDF detected, processing in smaller chunks"
                    );
                    sink.on_progress(
                        15,
                        &format!(
                            "Processing large PDF in chunks of {} pages...",
                            options.chunk_size
                        ),
                        ProgressExtra::none(),
                    );
                }
                sink.on_progress(
                    20,
                    "Extracting text from PDF (standard method)...",
                    ProgressExtra::none(),
                );
            }

            self.extractor
                .extract(DocumentSource::Path(&job.path), job.kind, &options, sink)?
        };

        let _step = info_span!("segment").entered();
        sink.on_progress(80, "Extracting hadiths...", ProgressExtra::none());

        let spans = self.segmenter.find_spans(&text);
        let total = spans.len();
        info!(total_hadiths = total, "Found potential hadiths");

        let mut hadiths = Vec::with_capacity(total);
        for (i, span) in spans.into_iter().enumerate() {
            let position = i + 1;
            hadiths.push(self.segmenter.candidate(position, span));
            sink.on_progress(
                scaled_percent(80, 15, position, total),
                &format!("Processing hadith {} of {}...", position, total),
                ProgressExtra::total_hadiths(total),
            );
        }

        Ok(ExtractionOutcome {
            total_hadiths: hadiths.len(),
            hadiths,
            text_length: text.chars().count(),
        })
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
