use std::path::Path;
use std::sync::Arc;

use crate::config::DocumentKind;
use crate::error::ProcessError;
use crate::processor::image::prepare_for_ocr;
use crate::processor::ocr::OcrEngine;
use crate::processor::poppler::PageRasterizer;
use crate::processor::{scaled_percent, DocumentProcessor, ExtractOptions, PdfSettings};
use crate::progress::{ProgressExtra, ProgressSink};
use crate::sanitize::redact_path;

pub struct PdfProcessor {
    ocr: Option<Arc<dyn OcrEngine>>,
    rasterizer: Arc<dyn PageRasterizer>,
    settings: PdfSettings,
}

struct TextLayer {
    text: String,
    page_count: usize,
}

impl PdfProcessor {
    pub fn new(
        ocr: Option<Arc<dyn OcrEngine>>,
        rasterizer: Arc<dyn PageRasterizer>,
        settings: PdfSettings,
    ) -> Self {
        Self {
            ocr,
            rasterizer,
            settings,
        }
    }
}

impl DocumentProcessor for PdfProcessor {
    fn extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
        sink: &dyn ProgressSink,
    ) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.pdf", file = %redact_path(path)).entered();

        std::fs::metadata(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (reason, page_hint, layer_text, layer_error) = if options.force_ocr {
            sink.on_progress(5, "Starting OCR processing...", ProgressExtra::none());
            let page_hint = lopdf_page_count(path).ok();
            ("forced", page_hint, String::new(), None)
        } else {
            sink.on_progress(5, "Starting text extraction...", ProgressExtra::none());
            match self.extract_text_layer(path, options, sink) {
                Ok(layer) if !should_use_ocr(&layer.text) => return Ok(layer.text),
                Ok(layer) => {
                    tracing::warn!(
                        "No usable text layer in {}, switching to OCR",
                        redact_path(path)
                    );
                    sink.on_progress(30, "No text found, switching to OCR...", ProgressExtra::none());
                    ("text_quality", Some(layer.page_count), layer.text, None)
                }
                Err(e) => {
                    // lopdf can't parse this PDF (e.g. invalid cross-reference table).
                    // poppler handles more PDF variants, so OCR may still work.
                    tracing::warn!(
                        "lopdf failed to parse {}: {}. Falling back to OCR.",
                        redact_path(path),
                        e
                    );
                    sink.on_progress(
                        30,
                        "Standard extraction failed, trying OCR...",
                        ProgressExtra::none(),
                    );
                    ("lopdf_parse_failed", None, String::new(), Some(e))
                }
            }
        };

        let Some(ocr) = &self.ocr else {
            return match layer_error {
                Some(e) => Err(not_readable(path, e)),
                None => Ok(layer_text),
            };
        };

        let _ocr_span = tracing::info_span!("processor.ocr_fallback", reason).entered();

        match self.ocr_document(path, ocr.as_ref(), page_hint, options, sink) {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => match layer_error {
                Some(e) => Err(not_readable(path, e)),
                None => Ok(layer_text),
            },
            Err(ProcessError::OcrUnavailable(msg)) if !layer_text.trim().is_empty() => {
                tracing::warn!("OCR unavailable, keeping extracted text layer: {}", msg);
                Ok(layer_text)
            }
            Err(e @ ProcessError::OcrUnavailable(_)) => Err(e),
            Err(e) => match layer_error {
                Some(layer_error) => Err(not_readable(path, layer_error)),
                None => Err(e),
            },
        }
    }

    fn supports(&self, kind: DocumentKind) -> bool {
        matches!(kind, DocumentKind::Pdf)
    }
}

impl PdfProcessor {
    fn extract_text_layer(
        &self,
        path: &Path,
        options: &ExtractOptions,
        sink: &dyn ProgressSink,
    ) -> Result<TextLayer, ProcessError> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| ProcessError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let total = page_numbers.len();

        sink.on_progress(
            10,
            &format!("Found {} pages", total),
            ProgressExtra::total_pages(total),
        );

        let Some(range) = options.page_range.resolve(total, self.settings.max_pages) else {
            return Ok(TextLayer {
                text: String::new(),
                page_count: total,
            });
        };

        let indices: Vec<usize> = range.collect();
        let mut chunks = Vec::new();

        for chunk in indices.chunks(options.chunk_size.max(1)) {
            let mut page_texts = Vec::with_capacity(chunk.len());

            for &index in chunk {
                let page_number = page_numbers[index];
                match doc.extract_text(&[page_number]) {
                    Ok(text) => page_texts.push(text),
                    Err(e) => tracing::debug!("No text on page {}: {}", page_number, e),
                }

                let done = index + 1;
                sink.on_progress(
                    scaled_percent(20, 60, done, total),
                    &format!("Extracting text from page {} of {}...", done, total),
                    ProgressExtra::pages(done, total),
                );
            }

            chunks.push(page_texts.join("\n"));

            if let (Some(first), Some(last)) = (chunk.first(), chunk.last()) {
                sink.on_progress(
                    scaled_percent(20, 60, last + 1, total),
                    &format!("Processed pages {}-{} of {}", first + 1, last + 1, total),
                    ProgressExtra::pages(last + 1, total),
                );
            }
        }

        Ok(TextLayer {
            text: chunks.join("\n\n").trim().to_string(),
            page_count: total,
        })
    }

    fn ocr_document(
        &self,
        path: &Path,
        ocr: &dyn OcrEngine,
        page_hint: Option<usize>,
        options: &ExtractOptions,
        sink: &dyn ProgressSink,
    ) -> Result<String, ProcessError> {
        sink.on_progress(10, "Converting PDF to images for OCR...", ProgressExtra::none());

        let total = match page_hint {
            Some(count) => count,
            None => self.rasterizer.page_count(path)?,
        };

        let Some(range) = options.page_range.resolve(total, self.settings.max_pages) else {
            return Ok(String::new());
        };
        let count = range.end() - range.start() + 1;

        sink.on_progress(
            20,
            &format!("Processing {} pages with OCR...", count),
            ProgressExtra::total_pages(total),
        );

        let mut texts = Vec::new();

        for (done, index) in range.enumerate() {
            let page_number = index + 1;

            match self
                .rasterizer
                .rasterize(path, page_number, self.settings.ocr_dpi)
            {
                Ok(image) => {
                    let prepared = prepare_for_ocr(&image, self.settings.contrast);
                    match ocr.recognize(&prepared) {
                        Ok(text) if !text.trim().is_empty() => texts.push(text.trim().to_string()),
                        Ok(_) => tracing::debug!("No text recognised on page {}", page_number),
                        Err(e @ ProcessError::OcrUnavailable(_)) => return Err(e),
                        Err(e) => tracing::warn!("OCR failed on page {}: {}", page_number, e),
                    }
                }
                Err(e) => tracing::warn!("Failed to rasterize page {}: {}", page_number, e),
            }

            sink.on_progress(
                scaled_percent(20, 70, done + 1, count),
                &format!("Processing page {} of {} with OCR...", page_number, total),
                ProgressExtra::pages(page_number, total),
            );
        }

        if texts.is_empty() {
            return Ok(String::new());
        }

        sink.on_progress(
            95,
            "OCR processing completed, finalizing text...",
            ProgressExtra::none(),
        );

        Ok(texts.join("\n\n"))
    }
}

fn not_readable(path: &Path, error: ProcessError) -> ProcessError {
    ProcessError::FileNotReadable {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

/// Page count from the PDF's own page tree.
pub fn lopdf_page_count(path: &Path) -> Result<usize, ProcessError> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| ProcessError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;
    Ok(doc.get_pages().len())
}

/// Page count from `lopdf`, falling back to the rasteriser for files it cannot parse.
pub fn count_pages(path: &Path, rasterizer: &dyn PageRasterizer) -> Result<usize, ProcessError> {
    match lopdf_page_count(path) {
        Ok(count) => Ok(count),
        Err(e) => {
            tracing::debug!("lopdf page count failed for {}: {}", redact_path(path), e);
            rasterizer.page_count(path).map_err(|_| not_readable(path, e))
        }
    }
}

/// Pattern for Identity-H Unimplemented errors (common with CID fonts).
const IDENTITY_H_PATTERN: &str = "?Identity-H Unimplemented?";

/// Minimum number of characters required before applying alphanumeric ratio check.
/// Text shorter than this is considered valid regardless of character composition.
const MIN_TOTAL_CHARS: usize = 50;

/// Minimum percentage of alphanumeric characters required for text to be considered valid.
const MIN_ALPHANUMERIC_PERCENT: usize = 10;

/// Determines if OCR should be used instead of extracted text.
/// Returns true if:
/// - Text is empty or whitespace only
/// - Text contains only font encoding error markers (Identity-H Unimplemented)
/// - Text contains very high ratio of non-printable/garbled characters
pub fn should_use_ocr(text: &str) -> bool {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return true;
    }

    let cleaned = trimmed
        .replace(IDENTITY_H_PATTERN, "")
        .replace(['\n', ' '], "");

    if cleaned.is_empty() {
        return true;
    }

    // chars().count() rather than len(): Arabic is multi-byte.
    let total_chars = trimmed.chars().count();
    let alphanumeric_chars = trimmed.chars().filter(|c| c.is_alphanumeric()).count();

    total_chars > MIN_TOTAL_CHARS
        && alphanumeric_chars * 100 < total_chars * MIN_ALPHANUMERIC_PERCENT
}
