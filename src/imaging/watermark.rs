use image::{DynamicImage, RgbaImage, imageops::FilterType};
use std::path::Path;
use tracing::{debug, info};

use super::inspect::decode;
use super::{Dimensions, ImagingError};

/// Dimensions a watermark takes on when fitted to a source image.
///
/// The watermark edge on the source's non-dominant axis matches the source
/// exactly: a landscape (or square) source fixes the watermark height, a
/// portrait source fixes its width. The other edge keeps the watermark's
/// own aspect ratio.
pub fn fitted_dimensions(watermark: Dimensions, source: Dimensions) -> Dimensions {
    if source.is_width_dominant() {
        watermark.scaled_to_height(source.height)
    } else {
        watermark.scaled_to_width(source.width)
    }
}

/// The watermark artwork, decoded once and shared read-only across requests.
///
/// Every request gets its own scaled copy from [`WatermarkTemplate::fit`];
/// the template itself is never modified.
#[derive(Debug)]
pub struct WatermarkTemplate {
    image: RgbaImage,
}

impl WatermarkTemplate {
    pub fn load(path: &Path) -> Result<Self, ImagingError> {
        let image = decode(path)?;
        info!(
            "Loaded watermark template {:?} ({}x{})",
            path,
            image.width(),
            image.height()
        );
        Ok(Self {
            image: image.to_rgba8(),
        })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    /// Produce a copy of the watermark scaled for a source of `source` size.
    pub fn fit(&self, source: Dimensions) -> ScaledWatermark {
        let target = fitted_dimensions(self.dimensions(), source);
        let image = if target == self.dimensions() {
            self.image.clone()
        } else {
            image::imageops::resize(&self.image, target.width, target.height, FilterType::Lanczos3)
        };

        debug!(
            "Fitted watermark {} to {} for source {}",
            self.dimensions(),
            target,
            source
        );
        ScaledWatermark { image }
    }
}

/// A per-request watermark layer sized for one source image.
#[derive(Debug, Clone)]
pub struct ScaledWatermark {
    image: RgbaImage,
}

impl ScaledWatermark {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}
