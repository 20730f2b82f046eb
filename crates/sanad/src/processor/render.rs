//! Single-page PDF rendering for the browser viewer.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::config::RenderConfig;
use crate::error::ProcessError;
use crate::processor::image::encode_png;
use crate::processor::pdf::count_pages;
use crate::processor::poppler::PageRasterizer;
use crate::sanitize::redact_path;

/// A rendered page. `current_page` is 1-based.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    #[serde(skip)]
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub current_page: usize,
    pub total_pages: usize,
    pub zoom: f32,
}

impl RenderedPage {
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

pub struct PageRenderer {
    rasterizer: Arc<dyn PageRasterizer>,
    settings: RenderConfig,
}

impl PageRenderer {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, settings: RenderConfig) -> Self {
        Self {
            rasterizer,
            settings,
        }
    }

    /// Renders the 0-based `page_number` at the configured DPI scaled by `zoom`.
    pub fn render_page(
        &self,
        path: &Path,
        page_number: i64,
        zoom: f32,
    ) -> Result<RenderedPage, ProcessError> {
        let _span = tracing::info_span!(
            "processor.render",
            file = %redact_path(path),
            page = page_number
        )
        .entered();

        validate_pdf_file(path)?;

        let total_pages = count_pages(path, self.rasterizer.as_ref())?;
        let index = usize::try_from(page_number)
            .ok()
            .filter(|&index| index < total_pages)
            .ok_or(ProcessError::PageOutOfRange {
                page: page_number,
                total: total_pages,
            })?;

        let zoom = self.clamp_zoom(zoom);
        let image = self
            .rasterizer
            .rasterize(path, index + 1, self.settings.dpi * zoom)?;
        let png = encode_png(&image)?;

        Ok(RenderedPage {
            png,
            width: image.width(),
            height: image.height(),
            current_page: index + 1,
            total_pages,
            zoom,
        })
    }

    /// Clamps into the configured bounds; non-finite input falls back to 1.0.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        zoom.clamp(self.settings.min_zoom, self.settings.max_zoom)
    }
}

fn validate_pdf_file(path: &Path) -> Result<(), ProcessError> {
    let reason = match std::fs::metadata(path) {
        Err(e) => format!("cannot access file: {}", e),
        Ok(meta) if !meta.is_file() => "not a regular file".to_string(),
        Ok(meta) if meta.len() == 0 => "file is empty".to_string(),
        Ok(_) => return Ok(()),
    };
    Err(ProcessError::FileNotReadable {
        path: path.to_path_buf(),
        reason,
    })
}
