//! Shared fixtures for sanad integration tests.
//!
//! - fake `OcrEngine` / `PageRasterizer` implementations
//! - in-memory PDF and DOCX builders

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use image::DynamicImage;
use lopdf::{dictionary, Document, Object, Stream};

use sanad::processor::{OcrEngine, PageRasterizer, PdfSettings};
use sanad::progress::{ProgressExtra, ProgressSink};
use sanad::{ProcessError, TextExtractor};

/// Rasteriser that fabricates a blank page image sized by the requested DPI.
#[derive(Default)]
pub struct FakeRasterizer {
    pub pages: Option<usize>,
    pub requests: Mutex<Vec<(usize, f32)>>,
}

impl PageRasterizer for FakeRasterizer {
    fn page_count(&self, _pdf_path: &Path) -> Result<usize, ProcessError> {
        self.pages
            .ok_or_else(|| ProcessError::PdfProcessing("pdfinfo unavailable".to_string()))
    }

    fn rasterize(
        &self,
        _pdf_path: &Path,
        page_number: usize,
        dpi: f32,
    ) -> Result<DynamicImage, ProcessError> {
        self.requests.lock().unwrap().push((page_number, dpi));
        let width = (dpi / 10.0).max(1.0) as u32;
        Ok(DynamicImage::new_rgb8(width, width * 2))
    }
}

/// OCR engine returning canned text per call (cycling through `pages`).
pub struct ScriptedOcr {
    pages: Vec<String>,
    calls: Mutex<usize>,
}

impl ScriptedOcr {
    pub fn new(pages: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, ProcessError> {
        let mut calls = self.calls.lock().unwrap();
        let text = self.pages[*calls % self.pages.len()].clone();
        *calls += 1;
        Ok(text)
    }
}

/// OCR engine whose initialisation always fails.
pub struct MissingOcr;

impl OcrEngine for MissingOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, ProcessError> {
        Err(ProcessError::OcrUnavailable(
            "Failed to initialize Tesseract".to_string(),
        ))
    }
}

/// Records every progress update as `(percent, message)`.
#[derive(Default)]
pub struct RecordingSink {
    pub updates: Mutex<Vec<(i32, String)>>,
}

impl RecordingSink {
    pub fn percents(&self) -> Vec<i32> {
        self.updates.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, percent: i32, message: &str, _extra: ProgressExtra) {
        self.updates
            .lock()
            .unwrap()
            .push((percent, message.to_string()));
    }
}

pub fn pdf_settings() -> PdfSettings {
    PdfSettings {
        ocr_dpi: 300.0,
        contrast: 2.0,
        max_pages: 1000,
    }
}

pub fn extractor(ocr: Option<Arc<dyn OcrEngine>>, rasterizer: Arc<dyn PageRasterizer>) -> TextExtractor {
    TextExtractor::new(ocr, rasterizer, pdf_settings())
}

/// PDF bytes with one page per entry; an empty entry is a page without text.
pub fn pdf_bytes(page_texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text)
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// DOCX bytes with one paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    cursor.into_inner()
}
