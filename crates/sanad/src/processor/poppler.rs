//! Page rasterisation through poppler-utils (`pdftoppm`, `pdfinfo`).

use std::path::Path;
use std::process::Command;

use image::DynamicImage;

use crate::error::ProcessError;

/// Turns PDF pages into images.
pub trait PageRasterizer: Send + Sync {
    /// Page count as seen by the rasteriser, used when `lopdf` cannot parse the file.
    fn page_count(&self, pdf_path: &Path) -> Result<usize, ProcessError>;

    /// Renders the 1-based `page_number` at `dpi`.
    fn rasterize(
        &self,
        pdf_path: &Path,
        page_number: usize,
        dpi: f32,
    ) -> Result<DynamicImage, ProcessError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PopplerRasterizer;

impl PopplerRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for PopplerRasterizer {
    fn page_count(&self, pdf_path: &Path) -> Result<usize, ProcessError> {
        let output = Command::new("pdfinfo")
            .arg(pdf_path)
            .output()
            .map_err(|e| {
                ProcessError::PdfProcessing(format!(
                    "Failed to run pdfinfo: {}. Make sure poppler-utils is installed.",
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(ProcessError::PdfProcessing(format!(
                "pdfinfo failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        parse_pdfinfo_pages(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            ProcessError::PdfProcessing("pdfinfo did not report a page count".to_string())
        })
    }

    fn rasterize(
        &self,
        pdf_path: &Path,
        page_number: usize,
        dpi: f32,
    ) -> Result<DynamicImage, ProcessError> {
        let temp_dir = tempfile::Builder::new()
            .prefix("sanad_render_")
            .tempdir()
            .map_err(|e| ProcessError::Render(format!("Failed to create temp dir: {}", e)))?;
        let output_prefix = temp_dir.path().join("page");
        let page = page_number.to_string();
        let resolution = dpi.to_string();

        let output = Command::new("pdftoppm")
            .args(["-png", "-singlefile", "-r", resolution.as_str()])
            .args(["-f", page.as_str(), "-l", page.as_str()])
            .arg(pdf_path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| {
                ProcessError::Render(format!(
                    "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(ProcessError::Render(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let image_path = output_prefix.with_extension("png");
        image::open(&image_path).map_err(|e| {
            ProcessError::Render(format!("Failed to read rendered page {}: {}", page_number, e))
        })
    }
}

fn parse_pdfinfo_pages(stdout: &str) -> Option<usize> {
    stdout.lines().find_map(|line| {
        line.strip_prefix("Pages:")
            .and_then(|count| count.trim().parse::<usize>().ok())
    })
}
