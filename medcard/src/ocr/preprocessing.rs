use image::{DynamicImage, GrayImage, ImageDecoder, ImageReader, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::{gaussian_blur_f32, median_filter};

use crate::error::{MedcardError, Result};

/// Contrast factor applied before the second Otsu pass.
const CONTRAST_FACTOR: f32 = 2.0;
/// Neighbourhood size for adaptive thresholding, in pixels.
const ADAPTIVE_WINDOW: u32 = 11;
/// Subtracted from the local weighted mean before comparing.
const ADAPTIVE_OFFSET: i16 = 2;

/// Tag used for attempts made against the unprocessed grayscale image.
pub const ORIGINAL_VARIANT: &str = "original";

/// Decode an encoded raster image (PNG, JPEG, ...) into an 8-bit grayscale grid
/// at its original resolution. EXIF orientation is applied so phone photos are upright.
pub fn normalize(bytes: &[u8]) -> Result<GrayImage> {
    if bytes.is_empty() {
        return Err(MedcardError::Decode("empty image buffer".to_string()));
    }

    let reader = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MedcardError::Decode(format!("Failed to read image: {e}")))?;

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| MedcardError::Decode(format!("Unsupported image: {e}")))?;

    let orientation = decoder
        .orientation()
        .unwrap_or(image::metadata::Orientation::NoTransforms);

    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| MedcardError::Decode(format!("Corrupt image data: {e}")))?;
    img.apply_orientation(orientation);

    Ok(img.to_luma8())
}

/// One preprocessed rendition of the source image.
#[derive(Debug, Clone)]
pub struct PreprocessedVariant {
    pub name: &'static str,
    pub pixels: GrayImage,
}

/// Preprocessing strategies, in the order they are handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    OtsuMedian,
    ContrastOtsuMedian,
    AdaptiveGaussian,
}

impl VariantKind {
    pub const ORDER: [VariantKind; 3] = [
        VariantKind::OtsuMedian,
        VariantKind::ContrastOtsuMedian,
        VariantKind::AdaptiveGaussian,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::OtsuMedian => "otsu_median",
            Self::ContrastOtsuMedian => "contrast_otsu_median",
            Self::AdaptiveGaussian => "adaptive_gaussian",
        }
    }

    pub fn apply(&self, gray: &GrayImage) -> PreprocessedVariant {
        let pixels = match self {
            Self::OtsuMedian => otsu_denoise(gray),
            Self::ContrastOtsuMedian => otsu_denoise(&enhance_contrast(gray, CONTRAST_FACTOR)),
            Self::AdaptiveGaussian => {
                adaptive_gaussian_threshold(gray, ADAPTIVE_WINDOW, ADAPTIVE_OFFSET)
            }
        };

        PreprocessedVariant {
            name: self.name(),
            pixels,
        }
    }
}

/// Build every variant from `gray`, cheapest and most broadly effective first.
pub fn generate_variants(gray: &GrayImage) -> Vec<PreprocessedVariant> {
    VariantKind::ORDER
        .iter()
        .map(|kind| kind.apply(gray))
        .collect()
}

/// Global Otsu binarization followed by a 3x3 median filter.
fn otsu_denoise(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    let binary = threshold(gray, level, ThresholdType::Binary);
    median_filter(&binary, 1, 1)
}

/// Scale each pixel's distance from the image mean by `factor`.
///
/// A factor of 1.0 leaves the image unchanged; 0.0 yields a flat grey image.
fn enhance_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    let mean = (sum as f32 / count as f32 + 0.5).floor();

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0] as f32;
        let stretched = mean + factor * (value - mean);
        Luma([stretched.round().clamp(0.0, 255.0) as u8])
    })
}

/// Per-pixel threshold against a Gaussian-weighted local mean.
///
/// A pixel turns white when it is brighter than the weighted mean of its
/// `window`-sized neighbourhood minus `offset`.
fn adaptive_gaussian_threshold(gray: &GrayImage, window: u32, offset: i16) -> GrayImage {
    let local_mean = gaussian_blur_f32(gray, window_sigma(window));

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0] as i16;
        let threshold = local_mean.get_pixel(x, y)[0] as i16 - offset;
        Luma([if value > threshold { 255 } else { 0 }])
    })
}

/// Standard deviation conventionally paired with a Gaussian kernel of `window` pixels.
fn window_sigma(window: u32) -> f32 {
    0.3 * ((window as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
