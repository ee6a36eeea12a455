use image::{DynamicImage, ImageEncoder, codecs::jpeg::JpegEncoder};
use std::path::Path;
use tracing::debug;

use crate::imaging::ImagingError;

/// Best quality, least compression.
pub const MAX_QUALITY: u8 = 100;

/// Encode an image as baseline JPEG at the given quality (1-100).
pub fn encode(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImagingError> {
    // JPEG doesn't support alpha channel, so convert to RGB
    let rgb_image = image.to_rgb8();
    let quality = quality.clamp(1, MAX_QUALITY);

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(
            &rgb_image,
            rgb_image.width(),
            rgb_image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImagingError::TransformFailure(format!("JPEG encode failed: {}", e)))?;

    debug!(
        "Encoded {}x{} JPEG at quality {}: {} bytes",
        rgb_image.width(),
        rgb_image.height(),
        quality,
        buffer.len()
    );

    Ok(buffer)
}

/// Encode as JPEG and replace whatever is at `path`.
pub fn save(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), ImagingError> {
    let bytes = encode(image, quality)?;
    super::write_replacing(path, &bytes)
}
