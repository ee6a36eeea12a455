// Imaging core - dimension inspection, resizing, watermark fitting, compositing and previews
mod composite;
mod error;
pub mod formats;
mod inspect;
mod preview;
mod resize;
mod types;
mod watermark;

pub use composite::{centered_offset, composite};
pub use error::ImagingError;
pub use inspect::{inspect, inspect_with_format};
pub use preview::derive_preview;
pub use resize::{constrained_dimensions, enforce_max_edge};
pub use types::{ArtifactKind, Dimensions, ImageArtifact};
pub use watermark::{ScaledWatermark, WatermarkTemplate, fitted_dimensions};
