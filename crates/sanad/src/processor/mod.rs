pub mod docx;
pub mod image;
pub mod ocr;
pub mod pdf;
pub mod poppler;
pub mod render;

use std::io::Write;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::config::{Config, DocumentKind};
use crate::error::ProcessError;
use crate::progress::ProgressSink;

pub use ocr::{OcrEngine, TesseractOcr};
pub use poppler::{PageRasterizer, PopplerRasterizer};
pub use render::{PageRenderer, RenderedPage};

/// 0-based page window; `end` is inclusive and defaults to the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl PageRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Concrete page indices for a document of `total` pages, at most
    /// `max_pages` of them. `None` when nothing falls inside the document.
    pub fn resolve(&self, total: usize, max_pages: usize) -> Option<RangeInclusive<usize>> {
        if total == 0 || max_pages == 0 || self.start >= total {
            return None;
        }
        let last = total - 1;
        let end = self.end.map_or(last, |end| end.min(last));
        let end = end.min(self.start + max_pages - 1);
        (self.start <= end).then(|| self.start..=end)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub page_range: PageRange,
    /// Pages extracted per chunk on the text-layer path.
    pub chunk_size: usize,
    pub force_ocr: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            page_range: PageRange::all(),
            chunk_size: 10,
            force_ocr: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfSettings {
    pub ocr_dpi: f32,
    pub contrast: f32,
    pub max_pages: usize,
}

impl PdfSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ocr_dpi: config.ocr.dpi as f32,
            contrast: config.ocr.contrast,
            max_pages: config.extraction.max_pages,
        }
    }
}

/// Where the document bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum DocumentSource<'a> {
    Path(&'a Path),
    /// In-memory upload; spooled to a temporary file for the duration of the call.
    Bytes(&'a [u8]),
}

pub trait DocumentProcessor: Send + Sync {
    fn extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
        sink: &dyn ProgressSink,
    ) -> Result<String, ProcessError>;

    fn supports(&self, kind: DocumentKind) -> bool;
}

/// Routes a document to the processor for its kind.
pub struct TextExtractor {
    processors: Vec<Box<dyn DocumentProcessor>>,
}

impl TextExtractor {
    pub fn new(
        ocr: Option<Arc<dyn OcrEngine>>,
        rasterizer: Arc<dyn PageRasterizer>,
        settings: PdfSettings,
    ) -> Self {
        let processors: Vec<Box<dyn DocumentProcessor>> = vec![
            Box::new(pdf::PdfProcessor::new(ocr, rasterizer, settings)),
            Box::new(docx::DocxProcessor::new()),
        ];
        Self { processors }
    }

    /// Tesseract (when enabled) and poppler, as configured.
    pub fn from_config(config: &Config) -> Self {
        let ocr: Option<Arc<dyn OcrEngine>> = if config.ocr.enabled {
            Some(Arc::new(TesseractOcr::from_config(&config.ocr)))
        } else {
            None
        };
        Self::new(
            ocr,
            Arc::new(PopplerRasterizer::new()),
            PdfSettings::from_config(config),
        )
    }

    pub fn extract(
        &self,
        source: DocumentSource<'_>,
        kind: DocumentKind,
        options: &ExtractOptions,
        sink: &dyn ProgressSink,
    ) -> Result<String, ProcessError> {
        let processor = self
            .processors
            .iter()
            .find(|p| p.supports(kind))
            .ok_or_else(|| ProcessError::UnsupportedFormat(kind.to_string()))?;

        let spooled;
        let path = match source {
            DocumentSource::Path(path) => path,
            DocumentSource::Bytes(bytes) => {
                spooled = spool(bytes, kind)?;
                spooled.path()
            }
        };

        let text = processor.extract(path, options, sink)?;

        if text.trim().is_empty() {
            return Err(ProcessError::ExtractionEmpty);
        }

        Ok(text)
    }
}

/// Writes `bytes` to a temporary file removed when the guard drops.
pub fn spool(bytes: &[u8], kind: DocumentKind) -> Result<NamedTempFile, ProcessError> {
    let mut file = tempfile::Builder::new()
        .prefix("sanad_upload_")
        .suffix(&format!(".{}", kind.as_str()))
        .tempfile()
        .map_err(|e| ProcessError::FileNotReadable {
            path: std::env::temp_dir(),
            reason: format!("Failed to create temp file: {}", e),
        })?;

    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| ProcessError::FileNotReadable {
            path: file.path().to_path_buf(),
            reason: format!("Failed to write temp file: {}", e),
        })?;

    Ok(file)
}

/// `base + span * done / total`, as a whole percentage.
pub(crate) fn scaled_percent(base: i32, span: i32, done: usize, total: usize) -> i32 {
    if total == 0 {
        return base;
    }
    base + (span as usize * done.min(total) / total) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{NoopProgress, ProgressExtra};
    use ::image::DynamicImage;
    use std::sync::Mutex;

    struct NoRasterizer;

    impl PageRasterizer for NoRasterizer {
        fn page_count(&self, _pdf_path: &Path) -> Result<usize, ProcessError> {
            Err(ProcessError::PdfProcessing("unavailable".to_string()))
        }

        fn rasterize(
            &self,
            _pdf_path: &Path,
            _page_number: usize,
            _dpi: f32,
        ) -> Result<DynamicImage, ProcessError> {
            Err(ProcessError::Render("unavailable".to_string()))
        }
    }

    struct RecordingSink(Mutex<Vec<i32>>);

    impl ProgressSink for RecordingSink {
        fn on_progress(&self, percent: i32, _message: &str, _extra: ProgressExtra) {
            self.0.lock().unwrap().push(percent);
        }
    }

    fn extractor() -> TextExtractor {
        TextExtractor::new(
            None,
            Arc::new(NoRasterizer),
            PdfSettings {
                ocr_dpi: 300.0,
                contrast: 2.0,
                max_pages: 1000,
            },
        )
    }

    fn docx_bytes(text: &str) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            zip.start_file(
                "word/document.xml",
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
            let xml = format!(
                r#"<w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
                text
            );
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_page_range_resolve() {
        assert_eq!(PageRange::all().resolve(5, 1000), Some(0..=4));
        assert_eq!(PageRange::new(2, None).resolve(5, 1000), Some(2..=4));
        assert_eq!(PageRange::new(1, Some(2)).resolve(5, 1000), Some(1..=2));
        assert_eq!(PageRange::new(1, Some(99)).resolve(5, 1000), Some(1..=4));
        assert_eq!(PageRange::all().resolve(5, 2), Some(0..=1));
        assert_eq!(PageRange::new(3, Some(1)).resolve(5, 1000), None);
        assert_eq!(PageRange::new(5, None).resolve(5, 1000), None);
        assert_eq!(PageRange::all().resolve(0, 1000), None);
    }

    #[test]
    fn test_scaled_percent() {
        assert_eq!(scaled_percent(20, 60, 0, 10), 20);
        assert_eq!(scaled_percent(20, 60, 5, 10), 50);
        assert_eq!(scaled_percent(20, 60, 10, 10), 80);
        assert_eq!(scaled_percent(20, 70, 1, 3), 43);
        assert_eq!(scaled_percent(80, 15, 3, 0), 80);
    }

    #[test]
    fn test_unsupported_kind() {
        let result = extractor().extract(
            DocumentSource::Bytes(b"plain text"),
            DocumentKind::Other,
            &ExtractOptions::default(),
            &NoopProgress,
        );
        match result {
            Err(ProcessError::UnsupportedFormat(kind)) => assert_eq!(kind, "other"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_docx_from_bytes() {
        let bytes = docx_bytes("حدثنا مالك عن نافع.");
        let sink = RecordingSink(Mutex::new(Vec::new()));

        let text = extractor()
            .extract(
                DocumentSource::Bytes(&bytes),
                DocumentKind::Docx,
                &ExtractOptions::default(),
                &sink,
            )
            .unwrap();

        assert_eq!(text, "حدثنا مالك عن نافع.");
        assert_eq!(*sink.0.lock().unwrap(), vec![30, 70]);
    }

    #[test]
    fn test_extract_docx_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.docx");
        std::fs::write(&path, docx_bytes("أخبرنا شعبة.")).unwrap();

        let text = extractor()
            .extract(
                DocumentSource::Path(&path),
                DocumentKind::Docx,
                &ExtractOptions::default(),
                &NoopProgress,
            )
            .unwrap();

        assert_eq!(text, "أخبرنا شعبة.");
    }

    #[test]
    fn test_blank_document_is_extraction_empty() {
        let bytes = docx_bytes("   ");
        let result = extractor().extract(
            DocumentSource::Bytes(&bytes),
            DocumentKind::Docx,
            &ExtractOptions::default(),
            &NoopProgress,
        );
        assert!(matches!(result, Err(ProcessError::ExtractionEmpty)));
    }

    #[test]
    fn test_spooled_file_removed_after_drop() {
        let spooled = spool(b"%PDF-1.5", DocumentKind::Pdf).unwrap();
        let path = spooled.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");

        drop(spooled);
        assert!(!path.exists());
    }

    #[test]
    fn test_spooled_file_removed_after_failure() {
        let before: Vec<_> = spooled_files();
        let result = extractor().extract(
            DocumentSource::Bytes(b"not a zip"),
            DocumentKind::Docx,
            &ExtractOptions::default(),
            &NoopProgress,
        );
        assert!(result.is_err());
        let leaked: Vec<_> = spooled_files()
            .into_iter()
            .filter(|p| !before.contains(p))
            .collect();
        assert!(leaked.is_empty(), "leaked temp files: {:?}", leaked);
    }

    fn spooled_files() -> Vec<std::path::PathBuf> {
        std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("sanad_upload_") && n.ends_with(".docx"))
            })
            .collect()
    }
}
