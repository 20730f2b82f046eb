//! Table-driven tests for text extraction across document kinds and
//! OCR fallback outcomes.

mod common;

use std::sync::Arc;

use common::{docx_bytes, extractor, pdf_bytes, FakeRasterizer, MissingOcr, RecordingSink, ScriptedOcr};
use sanad::processor::{OcrEngine, PageRasterizer};
use sanad::{DocumentKind, DocumentSource, ExtractOptions, PageRange, ProcessError};

#[derive(Clone, Copy)]
enum Ocr {
    Disabled,
    Scripted,
    Missing,
}

enum Expected {
    Contains(&'static [&'static str]),
    Exact(&'static str),
    FileNotReadable,
    ExtractionEmpty,
    OcrUnavailable,
    UnsupportedFormat,
}

struct ExtractionTestCase {
    name: &'static str,
    kind: DocumentKind,
    content: fn() -> Vec<u8>,
    ocr: Ocr,
    /// Page count reported by the rasteriser (`None` = pdfinfo fails).
    rasterizer_pages: Option<usize>,
    expected: Expected,
}

const OCR_PAGES: &[&str] = &["حدثنا مالك عن نافع.", "أخبرنا شعبة عن قتادة."];

const EXTRACTION_TESTS: &[ExtractionTestCase] = &[
    ExtractionTestCase {
        name: "pdf_text_layer",
        kind: DocumentKind::Pdf,
        content: || pdf_bytes(&["Hello World", "Second page"]),
        ocr: Ocr::Scripted,
        rasterizer_pages: None,
        expected: Expected::Contains(&["Hello World", "Second page"]),
    },
    ExtractionTestCase {
        name: "scanned_pdf_uses_ocr",
        kind: DocumentKind::Pdf,
        content: || pdf_bytes(&["", ""]),
        ocr: Ocr::Scripted,
        rasterizer_pages: None,
        expected: Expected::Exact("حدثنا مالك عن نافع.\n\nأخبرنا شعبة عن قتادة."),
    },
    ExtractionTestCase {
        name: "scanned_pdf_without_ocr_is_empty",
        kind: DocumentKind::Pdf,
        content: || pdf_bytes(&[""]),
        ocr: Ocr::Disabled,
        rasterizer_pages: None,
        expected: Expected::ExtractionEmpty,
    },
    ExtractionTestCase {
        name: "scanned_pdf_ocr_engine_missing",
        kind: DocumentKind::Pdf,
        content: || pdf_bytes(&[""]),
        ocr: Ocr::Missing,
        rasterizer_pages: None,
        expected: Expected::OcrUnavailable,
    },
    ExtractionTestCase {
        name: "corrupt_pdf_unreadable_by_both_paths",
        kind: DocumentKind::Pdf,
        content: || b"%PDF-1.4 truncated garbage".to_vec(),
        ocr: Ocr::Scripted,
        rasterizer_pages: None,
        expected: Expected::FileNotReadable,
    },
    ExtractionTestCase {
        name: "corrupt_pdf_recovered_by_ocr",
        kind: DocumentKind::Pdf,
        content: || b"%PDF-1.4 truncated garbage".to_vec(),
        ocr: Ocr::Scripted,
        rasterizer_pages: Some(1),
        expected: Expected::Exact("حدثنا مالك عن نافع."),
    },
    ExtractionTestCase {
        name: "corrupt_pdf_without_ocr",
        kind: DocumentKind::Pdf,
        content: || b"not a pdf".to_vec(),
        ocr: Ocr::Disabled,
        rasterizer_pages: Some(1),
        expected: Expected::FileNotReadable,
    },
    ExtractionTestCase {
        name: "docx_paragraphs",
        kind: DocumentKind::Docx,
        content: || docx_bytes(&["حدثنا مالك", "عن نافع."]),
        ocr: Ocr::Scripted,
        rasterizer_pages: None,
        expected: Expected::Exact("حدثنا مالك\nعن نافع."),
    },
    ExtractionTestCase {
        name: "legacy_doc_binary",
        kind: DocumentKind::Docx,
        content: || b"\xD0\xCF\x11\xE0 legacy word".to_vec(),
        ocr: Ocr::Scripted,
        rasterizer_pages: None,
        expected: Expected::FileNotReadable,
    },
    ExtractionTestCase {
        name: "blank_docx",
        kind: DocumentKind::Docx,
        content: || docx_bytes(&["", "  "]),
        ocr: Ocr::Scripted,
        rasterizer_pages: None,
        expected: Expected::ExtractionEmpty,
    },
    ExtractionTestCase {
        name: "other_kind_unsupported",
        kind: DocumentKind::Other,
        content: || b"plain text".to_vec(),
        ocr: Ocr::Scripted,
        rasterizer_pages: None,
        expected: Expected::UnsupportedFormat,
    },
];

fn run_case(case: &ExtractionTestCase) -> Result<String, ProcessError> {
    let ocr: Option<Arc<dyn OcrEngine>> = match case.ocr {
        Ocr::Disabled => None,
        Ocr::Scripted => Some(ScriptedOcr::new(OCR_PAGES)),
        Ocr::Missing => Some(Arc::new(MissingOcr)),
    };
    let rasterizer: Arc<dyn PageRasterizer> = Arc::new(FakeRasterizer {
        pages: case.rasterizer_pages,
        ..FakeRasterizer::default()
    });
    let content = (case.content)();

    extractor(ocr, rasterizer).extract(
        DocumentSource::Bytes(&content),
        case.kind,
        &ExtractOptions::default(),
        &RecordingSink::default(),
    )
}

#[test]
fn test_extraction_cases() {
    for case in EXTRACTION_TESTS {
        let result = run_case(case);

        match (&case.expected, result) {
            (Expected::Contains(needles), Ok(text)) => {
                for needle in needles.iter() {
                    assert!(
                        text.contains(needle),
                        "Test '{}': expected '{}' in {:?}",
                        case.name,
                        needle,
                        text
                    );
                }
            }
            (Expected::Exact(expected), Ok(text)) => {
                assert_eq!(&text, expected, "Test '{}'", case.name)
            }
            (Expected::FileNotReadable, Err(e)) => assert!(
                e.is_file_not_readable(),
                "Test '{}': expected unreadable file, got {:?}",
                case.name,
                e
            ),
            (Expected::ExtractionEmpty, Err(ProcessError::ExtractionEmpty)) => {}
            (Expected::OcrUnavailable, Err(ProcessError::OcrUnavailable(_))) => {}
            (Expected::UnsupportedFormat, Err(ProcessError::UnsupportedFormat(_))) => {}
            (_, other) => panic!("Test '{}': unexpected result {:?}", case.name, other),
        }
    }
}

#[test]
fn test_ocr_page_range_limits_rendered_pages() {
    let rasterizer = Arc::new(FakeRasterizer::default());
    let ocr = ScriptedOcr::new(OCR_PAGES);
    let content = pdf_bytes(&["", "", ""]);

    let options = ExtractOptions {
        page_range: PageRange::new(1, Some(1)),
        force_ocr: true,
        ..ExtractOptions::default()
    };
    let text = extractor(Some(ocr.clone()), rasterizer.clone())
        .extract(
            DocumentSource::Bytes(&content),
            DocumentKind::Pdf,
            &options,
            &RecordingSink::default(),
        )
        .unwrap();

    assert_eq!(text, OCR_PAGES[0]);
    assert_eq!(ocr.calls(), 1);
    assert_eq!(*rasterizer.requests.lock().unwrap(), vec![(2, 300.0)]);
}

#[test]
fn test_ocr_progress_sequence() {
    let content = pdf_bytes(&["", ""]);
    let sink = RecordingSink::default();

    extractor(
        Some(ScriptedOcr::new(OCR_PAGES)),
        Arc::new(FakeRasterizer::default()),
    )
    .extract(
        DocumentSource::Bytes(&content),
        DocumentKind::Pdf,
        &ExtractOptions {
            force_ocr: true,
            ..ExtractOptions::default()
        },
        &sink,
    )
    .unwrap();

    let messages = sink.messages();
    assert!(messages.iter().any(|m| m == "Converting PDF to images for OCR..."));
    assert!(messages.iter().any(|m| m == "Processing 2 pages with OCR..."));

    let percents = sink.percents();
    let ocr_tail: Vec<i32> = percents[percents.len() - 5..].to_vec();
    assert_eq!(ocr_tail, vec![10, 20, 55, 90, 95]);
}
