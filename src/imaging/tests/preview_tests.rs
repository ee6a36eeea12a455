use crate::imaging::{Dimensions, ImagingError, derive_preview, inspect};
use image::{ImageBuffer, Rgb};
use tempfile::TempDir;

#[test]
fn test_derive_preview_scales_to_width() {
    let temp_dir = TempDir::new().unwrap();
    let composite_path = temp_dir.path().join("user-react.jpg");
    let preview_path = temp_dir.path().join("user-react-preview.jpg");

    ImageBuffer::from_pixel(1024, 512, Rgb([90u8, 60, 30]))
        .save(&composite_path)
        .unwrap();

    let dims = derive_preview(&composite_path, &preview_path, 240, 100).unwrap();

    assert_eq!(dims, Dimensions::new(240, 120));
    assert_eq!(inspect(&preview_path).unwrap(), Dimensions::new(240, 120));
    // Composite is left alone
    assert_eq!(inspect(&composite_path).unwrap(), Dimensions::new(1024, 512));
}

#[test]
fn test_derive_preview_portrait() {
    let temp_dir = TempDir::new().unwrap();
    let composite_path = temp_dir.path().join("c.jpg");
    let preview_path = temp_dir.path().join("p.jpg");

    ImageBuffer::from_pixel(600, 900, Rgb([0u8, 0, 0]))
        .save(&composite_path)
        .unwrap();

    let dims = derive_preview(&composite_path, &preview_path, 240, 100).unwrap();
    assert_eq!(dims, Dimensions::new(240, 360));
}

#[test]
fn test_derive_preview_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let composite_path = temp_dir.path().join("c.jpg");
    let preview_path = temp_dir.path().join("p.jpg");

    ImageBuffer::from_fn(300, 200, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7u8]))
        .save(&composite_path)
        .unwrap();

    derive_preview(&composite_path, &preview_path, 240, 100).unwrap();
    let first = std::fs::read(&preview_path).unwrap();
    derive_preview(&composite_path, &preview_path, 240, 100).unwrap();
    assert_eq!(std::fs::read(&preview_path).unwrap(), first);
}

#[test]
fn test_derive_preview_rejects_zero_width() {
    let temp_dir = TempDir::new().unwrap();
    let composite_path = temp_dir.path().join("c.jpg");
    ImageBuffer::from_pixel(10, 10, Rgb([0u8, 0, 0]))
        .save(&composite_path)
        .unwrap();

    let err = derive_preview(&composite_path, &temp_dir.path().join("p.jpg"), 0, 100)
        .unwrap_err();
    assert!(matches!(err, ImagingError::TransformFailure(_)));
}
