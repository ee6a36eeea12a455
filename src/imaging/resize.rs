use image::imageops::FilterType;
use std::path::Path;
use tracing::{debug, info};

use super::inspect::{decode, inspect, inspect_with_format};
use super::{Dimensions, ImagingError, formats};

/// Target dimensions for an image that must fit inside a `max_edge` square,
/// or `None` when it already fits.
///
/// The dominant edge (width on a tie) becomes exactly `max_edge` and the
/// other edge scales proportionally.
pub fn constrained_dimensions(current: Dimensions, max_edge: u32) -> Option<Dimensions> {
    if current.fits_within(max_edge) {
        return None;
    }

    if current.is_width_dominant() {
        Some(current.scaled_to_width(max_edge))
    } else {
        Some(current.scaled_to_height(max_edge))
    }
}

/// Shrink the image at `path` in place so neither edge exceeds `max_edge`.
///
/// Images that already fit are left untouched, byte for byte. Resized images
/// keep their original container format; JPEG output uses `jpeg_quality`.
/// Returns the dimensions read back from the file afterwards.
pub fn enforce_max_edge(
    path: &Path,
    max_edge: u32,
    jpeg_quality: u8,
) -> Result<Dimensions, ImagingError> {
    if max_edge == 0 {
        return Err(ImagingError::TransformFailure(
            "max edge must be positive".to_string(),
        ));
    }

    let (current, format) = inspect_with_format(path)?;
    let Some(target) = constrained_dimensions(current, max_edge) else {
        debug!("{:?} is {} and fits within {}", path, current, max_edge);
        return Ok(current);
    };

    let img = decode(path)?;
    let resized = img.resize_exact(target.width, target.height, FilterType::Lanczos3);
    let bytes = formats::encode(&resized, format, jpeg_quality)?;
    formats::write_replacing(path, &bytes)?;

    let updated = inspect(path)?;
    info!(
        "Resized {:?} from {} to {} (max edge {})",
        path, current, updated, max_edge
    );
    Ok(updated)
}
