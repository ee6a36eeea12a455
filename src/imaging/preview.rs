use image::imageops::FilterType;
use std::path::Path;

use super::inspect::decode;
use super::{Dimensions, ImagingError, formats};

/// Write a copy of the composite at `target_width` wide, height scaled to
/// keep the aspect ratio, replacing any existing preview.
pub fn derive_preview(
    composite_path: &Path,
    preview_path: &Path,
    target_width: u32,
    jpeg_quality: u8,
) -> Result<Dimensions, ImagingError> {
    if target_width == 0 {
        return Err(ImagingError::TransformFailure(
            "preview width must be positive".to_string(),
        ));
    }

    let composite = decode(composite_path)?;
    let target =
        Dimensions::new(composite.width(), composite.height()).scaled_to_width(target_width);

    let preview = composite.resize_exact(target.width, target.height, FilterType::Lanczos3);
    formats::jpeg::save(&preview, preview_path, jpeg_quality)?;

    Ok(target)
}
