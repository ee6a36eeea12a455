use image::ImageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt image: {0}")]
    CorruptImage(String),

    #[error("Transform failed: {0}")]
    TransformFailure(String),

    #[error("Composite failed: {0}")]
    CompositeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ImageError> for ImagingError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Unsupported(e) => ImagingError::UnsupportedFormat(e.to_string()),
            ImageError::Decoding(e) => ImagingError::CorruptImage(e.to_string()),
            // A truncated file surfaces as an EOF while reading headers
            ImageError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                ImagingError::CorruptImage(e.to_string())
            }
            ImageError::IoError(e) => ImagingError::IoError(e),
            other => ImagingError::TransformFailure(other.to_string()),
        }
    }
}
