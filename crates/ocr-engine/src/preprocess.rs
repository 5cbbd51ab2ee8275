//! Page-image normalization ahead of recognition.
//!
//! Order matters: DPI rescale first, then grayscale, denoise, deskew, and
//! binarization last so the threshold sees the corrected image.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use imageproc::contrast::adaptive_threshold;
use imageproc::filter::median_filter;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use tracing::debug;

use crate::error::OcrError;

/// Skew angles below this are noise; rotating would only blur the glyphs.
const MIN_DESKEW_ANGLE_DEGREES: f32 = 0.25;

/// Width the skew search runs at. The estimate is resolution-insensitive,
/// so searching on a thumbnail keeps the cost flat per page.
const DESKEW_SEARCH_WIDTH: u32 = 400;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// DPI the output image is normalized to.
    pub target_dpi: u32,
    /// Convert to grayscale and binarize. Off, pages pass through
    /// rescaled but otherwise untouched.
    pub grayscale: bool,
    pub denoise: bool,
    /// Window radius of the adaptive threshold, in pixels at target DPI.
    pub adaptive_block_radius: u32,
    pub deskew: bool,
    /// Half-width of the deskew search range, in degrees.
    pub deskew_max_angle: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_dpi: 300,
            grayscale: true,
            denoise: true,
            adaptive_block_radius: 12,
            deskew: true,
            deskew_max_angle: 5.0,
        }
    }
}

/// Normalize one rasterized page for the OCR engine.
///
/// Guarantees the output is at `target_dpi` and, when `grayscale` is on,
/// binarized and contrast-normalized. Fails with [`OcrError::ImageDecode`]
/// on a degenerate buffer; the caller skips the page and flags it rather
/// than aborting the document.
pub fn preprocess(
    image: &DynamicImage,
    source_dpi: u32,
    config: &PreprocessConfig,
) -> Result<DynamicImage, OcrError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OcrError::ImageDecode(format!(
            "degenerate page buffer ({width}x{height})"
        )));
    }

    let rescaled = if source_dpi > 0 && source_dpi != config.target_dpi {
        let scale = config.target_dpi as f32 / source_dpi as f32;
        let new_width = ((width as f32 * scale).round() as u32).max(1);
        let new_height = ((height as f32 * scale).round() as u32).max(1);
        debug!(
            source_dpi,
            target_dpi = config.target_dpi,
            "rescaling page {}x{} -> {}x{}",
            width,
            height,
            new_width,
            new_height
        );
        image.resize_exact(new_width, new_height, FilterType::Lanczos3)
    } else {
        image.clone()
    };

    if !config.grayscale {
        return Ok(rescaled);
    }

    let mut gray = rescaled.to_luma8();

    if config.denoise {
        gray = median_filter(&gray, 1, 1);
    }

    if config.deskew {
        if let Some(angle) = estimate_skew_degrees(&gray, config.deskew_max_angle) {
            debug!(angle, "deskewing page");
            gray = rotate_about_center(
                &gray,
                angle.to_radians(),
                Interpolation::Bilinear,
                Luma([255u8]),
            );
        }
    }

    Ok(DynamicImage::ImageLuma8(adaptive_threshold(
        &gray,
        config.adaptive_block_radius,
    )))
}

/// Estimate page skew by searching for the rotation that maximizes the
/// variance of horizontal ink profiles: straight text lines concentrate
/// dark pixels into few rows, skewed lines smear them evenly.
fn estimate_skew_degrees(image: &GrayImage, max_angle: f32) -> Option<f32> {
    if max_angle <= 0.0 {
        return None;
    }

    let (width, height) = image.dimensions();
    let thumb = if width > DESKEW_SEARCH_WIDTH {
        let scale = DESKEW_SEARCH_WIDTH as f32 / width as f32;
        image::imageops::resize(
            image,
            DESKEW_SEARCH_WIDTH,
            ((height as f32 * scale).round() as u32).max(1),
            FilterType::Triangle,
        )
    } else {
        image.clone()
    };

    let mut best_angle = 0.0f32;
    let mut best_score = row_profile_variance(&thumb);

    let steps = (max_angle / 0.5).ceil() as i32;
    for step in -steps..=steps {
        if step == 0 {
            continue;
        }
        let angle = step as f32 * 0.5;
        let rotated = rotate_about_center(
            &thumb,
            angle.to_radians(),
            Interpolation::Nearest,
            Luma([255u8]),
        );
        let score = row_profile_variance(&rotated);
        if score > best_score {
            best_score = score;
            best_angle = angle;
        }
    }

    // Correcting a detected clockwise skew means rotating the other way.
    (best_angle.abs() >= MIN_DESKEW_ANGLE_DEGREES).then_some(-best_angle)
}

fn row_profile_variance(image: &GrayImage) -> f64 {
    let (width, height) = image.dimensions();
    if height == 0 || width == 0 {
        return 0.0;
    }

    let mut sums = Vec::with_capacity(height as usize);
    for y in 0..height {
        let ink: u64 = (0..width)
            .map(|x| 255u64 - u64::from(image.get_pixel(x, y)[0]))
            .sum();
        sums.push(ink as f64);
    }

    let mean = sums.iter().sum::<f64>() / sums.len() as f64;
    sums.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / sums.len() as f64
}
