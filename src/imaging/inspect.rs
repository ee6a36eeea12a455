use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use super::{Dimensions, ImagingError};

/// Read the width and height of the image at `path` from its headers only.
pub fn inspect(path: &Path) -> Result<Dimensions, ImagingError> {
    inspect_with_format(path).map(|(dimensions, _)| dimensions)
}

/// Like [`inspect`], also reporting the detected container format.
pub fn inspect_with_format(path: &Path) -> Result<(Dimensions, ImageFormat), ImagingError> {
    let (reader, format) = open_sniffed(path)?;
    let (width, height) = reader.into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(ImagingError::CorruptImage(format!(
            "{} reports zero-sized dimensions {}x{}",
            path.display(),
            width,
            height
        )));
    }

    let dimensions = Dimensions::new(width, height);
    debug!("Inspected {:?}: {} ({:?})", path, dimensions, format);
    Ok((dimensions, format))
}

/// Fully decode the image at `path`.
pub(crate) fn decode(path: &Path) -> Result<DynamicImage, ImagingError> {
    let (reader, _) = open_sniffed(path)?;
    Ok(reader.decode()?)
}

// Format comes from the leading bytes only. Stored files are all named
// `.jpg` whatever they contain, so the extension is never trusted.
fn open_sniffed(path: &Path) -> Result<(ImageReader<BufReader<File>>, ImageFormat), ImagingError> {
    let file = File::open(path)?;
    let reader = ImageReader::new(BufReader::new(file)).with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| ImagingError::UnsupportedFormat(format!("{}", path.display())))?;
    Ok((reader, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    #[test]
    fn test_inspect_png_and_jpeg() {
        let temp_dir = TempDir::new().unwrap();

        let png_path = temp_dir.path().join("wide.png");
        ImageBuffer::from_pixel(64, 32, Rgb([10u8, 20, 30]))
            .save(&png_path)
            .unwrap();
        let (dims, format) = inspect_with_format(&png_path).unwrap();
        assert_eq!(dims, Dimensions::new(64, 32));
        assert_eq!(format, ImageFormat::Png);

        let jpeg_path = temp_dir.path().join("tall.jpg");
        ImageBuffer::from_pixel(30, 90, Rgb([200u8, 100, 0]))
            .save(&jpeg_path)
            .unwrap();
        assert_eq!(inspect(&jpeg_path).unwrap(), Dimensions::new(30, 90));
    }

    #[test]
    fn test_inspect_sniffs_content_over_extension() {
        let temp_dir = TempDir::new().unwrap();
        let png_bytes_path = temp_dir.path().join("really-a-png.png");
        ImageBuffer::from_pixel(12, 8, Rgb([0u8, 0, 0]))
            .save(&png_bytes_path)
            .unwrap();

        // Downloaded files are always named .jpg regardless of their content
        let misnamed = temp_dir.path().join("user-profile.jpg");
        std::fs::copy(&png_bytes_path, &misnamed).unwrap();

        let (dims, format) = inspect_with_format(&misnamed).unwrap();
        assert_eq!(dims, Dimensions::new(12, 8));
        assert_eq!(format, ImageFormat::Png);
    }

    #[test]
    fn test_inspect_unknown_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = inspect(&path).unwrap_err();
        assert!(
            matches!(err, ImagingError::UnsupportedFormat(_)),
            "unexpected error: {:?}",
            err
        );
    }

    #[test]
    fn test_inspect_corrupt_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        // SOI marker followed by garbage
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0x00, 0x13, 0x37]).unwrap();

        let err = inspect(&path).unwrap_err();
        assert!(
            matches!(err, ImagingError::CorruptImage(_)),
            "unexpected error: {:?}",
            err
        );
    }

    #[test]
    fn test_inspect_missing_file() {
        let err = inspect(Path::new("/nonexistent/missing.jpg")).unwrap_err();
        assert!(matches!(err, ImagingError::IoError(_)));
    }
}
