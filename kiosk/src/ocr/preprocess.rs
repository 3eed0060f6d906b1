use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use imageproc::filter::median_filter;

use crate::config::OcrConfig;
use crate::error::{KioskError, Result};

/// Which transform chain produced the buffer handed to recognition.
///
/// Recorded so a degraded preprocessing path is visible in logs and to
/// callers instead of being silently swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessTier {
    /// Full chain: grayscale, bounded resize, contrast, sharpen, denoise.
    Primary,
    /// Reduced chain: grayscale, bounded resize, stronger contrast.
    Fallback,
    /// Both chains failed; the original bytes were passed through.
    Original,
}

impl PreprocessTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreprocessTier::Primary => "primary",
            PreprocessTier::Fallback => "fallback",
            PreprocessTier::Original => "original",
        }
    }
}

/// Normalize an image for recognition, degrading through the tiers on
/// failure. Returns the processed bytes (PNG) and the tier that produced
/// them. Never fails outright: the last tier passes the input through.
pub fn preprocess(bytes: &[u8], config: &OcrConfig) -> (Vec<u8>, PreprocessTier) {
    match primary_chain(bytes, config) {
        Ok(processed) if processed.len() >= config.min_output_bytes => {
            (processed, PreprocessTier::Primary)
        }
        Ok(processed) => {
            tracing::warn!(
                output_bytes = processed.len(),
                min = config.min_output_bytes,
                "Primary preprocessing output suspiciously small, trying fallback"
            );
            fallback_or_original(bytes, config)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Primary preprocessing failed, trying fallback");
            fallback_or_original(bytes, config)
        }
    }
}

fn fallback_or_original(bytes: &[u8], config: &OcrConfig) -> (Vec<u8>, PreprocessTier) {
    match fallback_chain(bytes, config) {
        Ok(processed) => (processed, PreprocessTier::Fallback),
        Err(e) => {
            tracing::warn!(error = %e, "Fallback preprocessing failed, using original buffer");
            (bytes.to_vec(), PreprocessTier::Original)
        }
    }
}

/// Validate that the payload is a decodable image with sane dimensions.
/// Called before any recognition work so malformed uploads fail as client
/// errors rather than exhausting the recognition sweep.
pub fn validate_image(bytes: &[u8]) -> Result<()> {
    let format = image::guess_format(bytes)
        .map_err(|_| KioskError::Validation("Unsupported or unrecognized image format".into()))?;

    match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::Tiff
        | ImageFormat::WebP => {}
        other => {
            return Err(KioskError::Validation(format!(
                "Unsupported image format: {other:?}"
            )));
        }
    }

    let (width, height) = decode(bytes)?.dimensions();
    if width == 0 || height == 0 {
        return Err(KioskError::Validation(format!(
            "Invalid image dimensions: {width}x{height}"
        )));
    }

    Ok(())
}

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| KioskError::Image(format!("Failed to read image: {e}")))?;
    reader
        .decode()
        .map_err(|e| KioskError::Image(format!("Failed to decode image: {e}")))
}

fn primary_chain(bytes: &[u8], config: &OcrConfig) -> Result<Vec<u8>> {
    let img = decode(bytes)?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(KioskError::Image(format!(
            "Invalid image dimensions: {width}x{height}"
        )));
    }

    let img = resize_if_needed(img, config.max_dimension);
    let gray = img.grayscale().to_luma8();

    // Tuned for phone captures: 1px-radius median denoise, then contrast,
    // then a soft sharpen pass.
    let denoised = median_filter(&gray, 1, 1);
    let boosted = DynamicImage::ImageLuma8(denoised)
        .adjust_contrast(20.0)
        .unsharpen(1.0, 2);

    encode_png(&boosted)
}

fn fallback_chain(bytes: &[u8], config: &OcrConfig) -> Result<Vec<u8>> {
    let img = decode(bytes)?;
    let img = resize_if_needed(img, config.max_dimension);

    // Stronger contrast for low-light captures, nothing else.
    let boosted = img.grayscale().adjust_contrast(50.0);
    encode_png(&boosted)
}

/// Cap both sides at `max_dim`, preserving aspect ratio. Never upscales.
fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_dim && height <= max_dim {
        return img;
    }

    let ratio = if width > height {
        max_dim as f32 / width as f32
    } else {
        max_dim as f32 / height as f32
    };

    let new_width = (width as f32 * ratio) as u32;
    let new_height = (height as f32 * ratio) as u32;

    img.resize(
        new_width.max(1),
        new_height.max(1),
        image::imageops::FilterType::Lanczos3,
    )
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| KioskError::Image(format!("Failed to encode image: {e}")))?;
    Ok(output)
}
