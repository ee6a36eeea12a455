pub mod jpeg;

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use super::ImagingError;

/// Encode an image in the given format. JPEG honours `jpeg_quality`; other
/// formats use the image crate's default encoder settings.
pub fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, ImagingError> {
    match format {
        ImageFormat::Jpeg => jpeg::encode(image, jpeg_quality),
        other => {
            let mut buffer = Vec::new();
            image.write_to(&mut Cursor::new(&mut buffer), other)?;
            Ok(buffer)
        }
    }
}

/// Replace the file at `path` with `bytes`.
///
/// The bytes land in a sibling temporary file first and are renamed over the
/// target, so readers never observe a partially written image.
pub fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), ImagingError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ImagingError::TransformFailure(format!("Invalid output path: {:?}", path)))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&temp_path, bytes)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}
