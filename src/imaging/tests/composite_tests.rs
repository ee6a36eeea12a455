use crate::imaging::{
    Dimensions, ImagingError, WatermarkTemplate, centered_offset, composite, inspect,
};
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, Rgba};
use tempfile::TempDir;

fn opaque_template(width: u32, height: u32, color: Rgba<u8>) -> WatermarkTemplate {
    WatermarkTemplate::from_image(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
        width, height, color,
    )))
}

#[test]
fn test_centered_offset_landscape() {
    let offset = centered_offset(Dimensions::new(1024, 512), Dimensions::new(512, 512));
    assert_eq!(offset, (256, 0));
}

#[test]
fn test_centered_offset_portrait() {
    let offset = centered_offset(Dimensions::new(600, 900), Dimensions::new(600, 600));
    assert_eq!(offset, (0, 150));
}

#[test]
fn test_centered_offset_negative_when_overlay_is_wider() {
    // A 2:1 watermark fitted to a square source overhangs horizontally
    let offset = centered_offset(Dimensions::new(300, 300), Dimensions::new(600, 300));
    assert_eq!(offset, (-150, 0));

    // Odd overhang floors towards negative infinity
    let offset = centered_offset(Dimensions::new(10, 10), Dimensions::new(13, 10));
    assert_eq!(offset, (-2, 0));
}

#[test]
fn test_centered_offset_centering_holds() {
    let pairs = [
        ((1024, 512), (512, 512)),
        ((600, 900), (600, 600)),
        ((300, 300), (600, 300)),
        ((1000, 400), (200, 400)),
        ((64, 128), (64, 32)),
    ];

    for ((sw, sh), (ww, wh)) in pairs {
        let (x, y) = centered_offset(Dimensions::new(sw, sh), Dimensions::new(ww, wh));
        assert_eq!(x * 2 + ww as i64, sw as i64);
        assert_eq!(y * 2 + wh as i64, sh as i64);
    }
}

#[test]
fn test_composite_places_watermark_in_center() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("user-profile.jpg");
    let out_path = temp_dir.path().join("user-react.jpg");

    ImageBuffer::from_pixel(200, 100, Rgb([0u8, 0, 0]))
        .save(&source_path)
        .unwrap();
    let source_dims = inspect(&source_path).unwrap();

    let template = opaque_template(50, 50, Rgba([255, 255, 255, 255]));
    let watermark = template.fit(source_dims);
    assert_eq!(watermark.dimensions(), Dimensions::new(100, 100));

    let dims = composite(&source_path, source_dims, &watermark, &out_path, 100).unwrap();
    assert_eq!(dims, Dimensions::new(200, 100));

    let output = image::open(&out_path).unwrap();
    assert_eq!(output.dimensions(), (200, 100));

    // Watermark covers x in [50, 150), the margins stay black
    let center = output.get_pixel(100, 50);
    let left = output.get_pixel(10, 50);
    let right = output.get_pixel(190, 50);
    assert!(center[0] > 240, "center should be white, got {:?}", center);
    assert!(left[0] < 15, "left margin should be black, got {:?}", left);
    assert!(right[0] < 15, "right margin should be black, got {:?}", right);
}

#[test]
fn test_composite_blends_translucent_watermark() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("source.png");
    let out_path = temp_dir.path().join("out.jpg");

    ImageBuffer::from_pixel(64, 64, Rgb([0u8, 0, 0]))
        .save(&source_path)
        .unwrap();
    let template = opaque_template(64, 64, Rgba([255, 255, 255, 128]));
    let watermark = template.fit(Dimensions::new(64, 64));

    composite(&source_path, Dimensions::new(64, 64), &watermark, &out_path, 100).unwrap();

    let pixel = image::open(&out_path).unwrap().get_pixel(32, 32);
    assert!(
        (110..=145).contains(&pixel[0]),
        "expected roughly half intensity, got {:?}",
        pixel
    );
}

#[test]
fn test_composite_overwrites_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("source.png");
    let out_path = temp_dir.path().join("out.jpg");
    std::fs::write(&out_path, b"stale").unwrap();

    ImageBuffer::from_pixel(40, 20, Rgb([10u8, 10, 10]))
        .save(&source_path)
        .unwrap();
    let watermark = opaque_template(10, 10, Rgba([0, 0, 0, 0])).fit(Dimensions::new(40, 20));

    composite(&source_path, Dimensions::new(40, 20), &watermark, &out_path, 100).unwrap();
    assert_eq!(inspect(&out_path).unwrap(), Dimensions::new(40, 20));
}

#[test]
fn test_composite_rejects_stale_dimensions() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("source.png");
    let out_path = temp_dir.path().join("out.jpg");

    ImageBuffer::from_pixel(40, 20, Rgb([10u8, 10, 10]))
        .save(&source_path)
        .unwrap();
    let watermark = opaque_template(10, 10, Rgba([0, 0, 0, 255])).fit(Dimensions::new(80, 40));

    let err = composite(&source_path, Dimensions::new(80, 40), &watermark, &out_path, 100)
        .unwrap_err();
    assert!(matches!(err, ImagingError::CompositeError(_)));
    assert!(!out_path.exists());
}

#[test]
fn test_composite_undecodable_source() {
    let temp_dir = TempDir::new().unwrap();
    let source_path = temp_dir.path().join("source.jpg");
    let out_path = temp_dir.path().join("out.jpg");
    std::fs::write(&source_path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();

    let watermark = opaque_template(10, 10, Rgba([0, 0, 0, 255])).fit(Dimensions::new(10, 10));
    let err =
        composite(&source_path, Dimensions::new(10, 10), &watermark, &out_path, 100).unwrap_err();
    assert!(matches!(err, ImagingError::CompositeError(_)));
}
