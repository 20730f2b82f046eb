use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::config::DocumentKind;
use crate::error::ProcessError;
use crate::processor::{DocumentProcessor, ExtractOptions};
use crate::progress::{ProgressExtra, ProgressSink};

/// Word documents: paragraph text from `word/document.xml`, no OCR path.
pub struct DocxProcessor;

impl DocxProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for DocxProcessor {
    fn extract(
        &self,
        path: &Path,
        _options: &ExtractOptions,
        sink: &dyn ProgressSink,
    ) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.docx").entered();

        sink.on_progress(30, "Reading Word document...", ProgressExtra::none());

        let file = std::fs::File::open(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ProcessError::DocxProcessing(format!("Failed to open DOCX: {}", e)))?;

        let text = extract_docx_text(&mut archive)?;

        sink.on_progress(70, "Word document text extracted", ProgressExtra::none());

        Ok(text)
    }

    fn supports(&self, kind: DocumentKind) -> bool {
        matches!(kind, DocumentKind::Docx)
    }
}

fn extract_docx_text<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, ProcessError> {
    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| ProcessError::DocxProcessing(format!("Failed to find document.xml: {}", e)))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| ProcessError::DocxProcessing(format!("Failed to read document.xml: {}", e)))?;

    parse_docx_xml(&xml_content)
}

/// Paragraph texts joined with `\n`; empty paragraphs are kept as blank lines.
fn parse_docx_xml(xml: &str) -> Result<String, ProcessError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text_element = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_paragraph => current.push('\t'),
                b"br" | b"cr" if in_paragraph => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" if in_paragraph => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_paragraph = false;
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_element => {
                let decoded = e.unescape().map_err(|err| {
                    ProcessError::DocxProcessing(format!("Invalid text in document.xml: {}", err))
                })?;
                current.push_str(&decoded);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ProcessError::DocxProcessing(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}
