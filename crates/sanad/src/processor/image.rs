//! Raster helpers shared by OCR and page rendering.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::error::ProcessError;

/// Grayscale conversion followed by a contrast boost.
///
/// `contrast` is a multiplier where 1.0 leaves the image unchanged and 2.0
/// doubles the spread around mid-gray.
pub fn prepare_for_ocr(image: &DynamicImage, contrast: f32) -> DynamicImage {
    let gray = image.grayscale();
    if !contrast.is_finite() || (contrast - 1.0).abs() < f32::EPSILON {
        return gray;
    }
    gray.adjust_contrast(contrast_percent(contrast))
}

/// Maps a multiplier onto `image`'s percentage scale, which squares
/// `(100 + c) / 100`.
fn contrast_percent(multiplier: f32) -> f32 {
    (multiplier.max(0.0).sqrt() - 1.0) * 100.0
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ProcessError> {
    let mut png_data = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)
        .map_err(|e| ProcessError::ImageProcessing(format!("Failed to encode PNG: {}", e)))?;
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample() -> DynamicImage {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(0, 0, Rgb([200, 40, 40]));
        img.put_pixel(1, 0, Rgb([60, 60, 60]));
        img.put_pixel(2, 0, Rgb([100, 100, 100]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_prepare_for_ocr_is_grayscale() {
        let prepared = prepare_for_ocr(&sample(), 2.0);
        assert!(matches!(prepared, DynamicImage::ImageLuma8(_)));
        assert_eq!((prepared.width(), prepared.height()), (4, 2));
    }

    #[test]
    fn test_contrast_spreads_values() {
        let gray = sample().grayscale().to_luma8();
        let boosted = prepare_for_ocr(&sample(), 2.0).to_luma8();

        // Dark pixel gets darker, black stays black.
        assert!(boosted.get_pixel(1, 0)[0] < gray.get_pixel(1, 0)[0]);
        assert_eq!(boosted.get_pixel(3, 1)[0], 0);
    }

    #[test]
    fn test_unit_contrast_is_plain_grayscale() {
        let gray = sample().grayscale().to_luma8();
        let prepared = prepare_for_ocr(&sample(), 1.0).to_luma8();
        assert_eq!(gray, prepared);
    }

    #[test]
    fn test_contrast_percent_mapping() {
        assert!(contrast_percent(1.0).abs() < 1e-4);
        assert!((contrast_percent(4.0) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_png_encode_roundtrips_dimensions() {
        let png = encode_png(&sample()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 4);
    }
}
