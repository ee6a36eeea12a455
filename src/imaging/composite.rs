use image::{DynamicImage, imageops};
use std::path::Path;
use tracing::debug;

use super::inspect::decode;
use super::watermark::ScaledWatermark;
use super::{Dimensions, ImagingError, formats};

/// Offset that centers `overlay` on `base`, using floor division.
///
/// Negative when the overlay is larger than the base on that axis; the
/// overhang is clipped evenly on both sides.
pub fn centered_offset(base: Dimensions, overlay: Dimensions) -> (i64, i64) {
    let x = (i64::from(base.width) - i64::from(overlay.width)).div_euclid(2);
    let y = (i64::from(base.height) - i64::from(overlay.height)).div_euclid(2);
    (x, y)
}

/// Alpha-blend `watermark` centered over the source image and write the
/// result to `out_path` as JPEG, replacing any existing file.
///
/// The canvas is the size of the source. `source_dims` must match what is on
/// disk; a mismatch means the source changed under us and is reported as a
/// composite failure rather than silently producing a misaligned overlay.
pub fn composite(
    source_path: &Path,
    source_dims: Dimensions,
    watermark: &ScaledWatermark,
    out_path: &Path,
    jpeg_quality: u8,
) -> Result<Dimensions, ImagingError> {
    let source = decode(source_path).map_err(|e| {
        ImagingError::CompositeError(format!("decoding source {:?}: {}", source_path, e))
    })?;

    let decoded = Dimensions::new(source.width(), source.height());
    if decoded != source_dims {
        return Err(ImagingError::CompositeError(format!(
            "source {:?} is {} but {} was expected",
            source_path, decoded, source_dims
        )));
    }

    let (x, y) = centered_offset(source_dims, watermark.dimensions());
    debug!(
        "Compositing {} watermark onto {} source at ({}, {})",
        watermark.dimensions(),
        source_dims,
        x,
        y
    );

    let mut canvas = source.to_rgba8();
    imageops::overlay(&mut canvas, watermark.image(), x, y);

    formats::jpeg::save(&DynamicImage::ImageRgba8(canvas), out_path, jpeg_quality)
        .map_err(|e| ImagingError::CompositeError(format!("writing {:?}: {}", out_path, e)))?;

    Ok(source_dims)
}
