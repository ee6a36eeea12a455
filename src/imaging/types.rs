use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Width and height of an encoded image, as read from its headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width is the dominant axis when it is at least as large as the height.
    pub fn is_width_dominant(&self) -> bool {
        self.width >= self.height
    }

    pub fn max_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn fits_within(&self, max_edge: u32) -> bool {
        self.width <= max_edge && self.height <= max_edge
    }

    /// Dimensions with the given width and the height scaled to keep the aspect ratio.
    pub fn scaled_to_width(&self, width: u32) -> Self {
        Self {
            width,
            height: scale_edge(self.height, width, self.width),
        }
    }

    /// Dimensions with the given height and the width scaled to keep the aspect ratio.
    pub fn scaled_to_height(&self, height: u32) -> Self {
        Self {
            width: scale_edge(self.width, height, self.height),
            height,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// Round half up, never collapse an edge to zero.
fn scale_edge(edge: u32, numerator: u32, denominator: u32) -> u32 {
    let denominator = u64::from(denominator.max(1));
    let scaled = (u64::from(edge) * u64::from(numerator) + denominator / 2) / denominator;
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}

/// The per-subject files kept in the image store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Downloaded source picture, rewritten at most once by the resizer.
    Source,
    /// Watermarked output.
    Composite,
    /// Downscaled derivative of the composite.
    Preview,
}

impl ArtifactKind {
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Source => "profile",
            ArtifactKind::Composite => "react",
            ArtifactKind::Preview => "react-preview",
        }
    }

    pub fn extension(&self) -> &'static str {
        "jpg"
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_suffix())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub dimensions: Dimensions,
    pub format: ImageFormat,
}
