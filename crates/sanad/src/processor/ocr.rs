use std::sync::Arc;

use image::DynamicImage;
use leptess::{LepTess, Variable};

use crate::config::OcrConfig;
use crate::error::ProcessError;
use crate::processor::image::encode_png;

/// Recognises text in a page image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ProcessError>;
}

/// Tesseract through `leptess`. A fresh engine is initialised per image.
#[derive(Clone)]
pub struct TesseractOcr {
    inner: Arc<TesseractOcrInner>,
}

struct TesseractOcrInner {
    languages: String,
    dpi: u32,
    page_segmentation_mode: u32,
    preserve_interword_spaces: bool,
}

impl TesseractOcr {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::with_settings(
            &config.languages,
            config.dpi,
            config.page_segmentation_mode,
            config.preserve_interword_spaces,
        )
    }

    fn with_settings(
        languages: &[String],
        dpi: u32,
        page_segmentation_mode: u32,
        preserve_interword_spaces: bool,
    ) -> Self {
        let lang_str = if languages.is_empty() {
            "ara".to_string()
        } else {
            languages.join("+")
        };

        Self {
            inner: Arc::new(TesseractOcrInner {
                languages: lang_str,
                dpi,
                page_segmentation_mode,
                preserve_interword_spaces,
            }),
        }
    }

    fn engine(&self) -> Result<LepTess, ProcessError> {
        let mut lt = LepTess::new(None, &self.inner.languages).map_err(|e| {
            ProcessError::OcrUnavailable(format!(
                "Failed to initialize Tesseract for '{}': {}",
                self.inner.languages, e
            ))
        })?;

        lt.set_variable(
            Variable::TesseditPagesegMode,
            &self.inner.page_segmentation_mode.to_string(),
        )
        .map_err(|e| ProcessError::OcrFailed(format!("Failed to set page segmentation: {}", e)))?;

        let preserve = if self.inner.preserve_interword_spaces {
            "1"
        } else {
            "0"
        };
        lt.set_variable(Variable::PreserveInterwordSpaces, preserve)
            .map_err(|e| {
                ProcessError::OcrFailed(format!("Failed to set interword spacing: {}", e))
            })?;

        Ok(lt)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.ocr", languages = %self.inner.languages)
            .entered();

        let png_data = encode_png(image).map_err(|e| ProcessError::OcrFailed(e.to_string()))?;

        let mut lt = self.engine()?;

        lt.set_image_from_mem(&png_data)
            .map_err(|e| ProcessError::OcrFailed(format!("Failed to set image for OCR: {}", e)))?;
        lt.set_source_resolution(self.inner.dpi as i32);

        let text = lt
            .get_utf8_text()
            .map_err(|e| ProcessError::OcrFailed(format!("OCR failed: {}", e)))?;

        Ok(text)
    }
}
