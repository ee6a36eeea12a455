use image::ImageFormat;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

use crate::ImagingConfig;
use crate::imaging::{
    self, ArtifactKind, Dimensions, ImageArtifact, ImagingError, WatermarkTemplate,
};
use crate::messaging::{Message, MessagingError};
use crate::store::{ContentId, ImageStore, StoreError};

/// Named steps of one request, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Store,
    Inspect,
    Constrain,
    Reinspect,
    FitWatermark,
    Composite,
    Preview,
    Reply,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Download => "download",
            Stage::Store => "store",
            Stage::Inspect => "inspect",
            Stage::Constrain => "constrain",
            Stage::Reinspect => "reinspect",
            Stage::FitWatermark => "fit-watermark",
            Stage::Composite => "composite",
            Stage::Preview => "preview",
            Stage::Reply => "reply",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Download failed: {0}")]
    Download(#[source] MessagingError),

    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("{stage} stage failed: {source}")]
    Image {
        stage: Stage,
        #[source]
        source: ImagingError,
    },

    #[error("{stage} stage timed out after {timeout:?}")]
    Timeout { stage: Stage, timeout: Duration },

    #[error("{stage} stage task failed: {message}")]
    Join { stage: Stage, message: String },

    #[error("Reply failed: {0}")]
    Reply(#[source] MessagingError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Download(_) => Stage::Download,
            PipelineError::Store(_) => Stage::Store,
            PipelineError::Image { stage, .. }
            | PipelineError::Timeout { stage, .. }
            | PipelineError::Join { stage, .. } => *stage,
            PipelineError::Reply(_) => Stage::Reply,
        }
    }
}

/// Tunables for the image stages.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_edge: u32,
    pub preview_width: u32,
    pub jpeg_quality: u8,
    pub transform_timeout: Duration,
}

impl From<&ImagingConfig> for PipelineSettings {
    fn from(config: &ImagingConfig) -> Self {
        Self {
            max_edge: config.max_edge,
            preview_width: config.preview_width,
            jpeg_quality: config.jpeg_quality,
            transform_timeout: Duration::from_secs(config.transform_timeout_secs),
        }
    }
}

/// Artifacts produced by one successful run.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub content_id: ContentId,
    pub source: ImageArtifact,
    pub composite: ImageArtifact,
    pub preview: ImageArtifact,
}

/// One async lock per content id, so runs for the same subject never
/// interleave on its files.
#[derive(Clone, Default)]
struct ContentLocks {
    locks: Arc<Mutex<HashMap<ContentId, Arc<tokio::sync::Mutex<()>>>>>,
}

impl ContentLocks {
    async fn acquire(&self, content_id: &ContentId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Entries only the map still references are idle
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(content_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

/// Turns source bytes into a watermarked composite and its preview.
///
/// Stages run strictly in order, each on the blocking pool and bounded by
/// the transform timeout. The watermark template is shared read-only; every
/// run fits its own copy, so concurrent runs for different subjects never
/// see each other's watermark. Runs for the same content id are serialized
/// from storing the source through writing the preview.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<ImageStore>,
    watermark: Arc<WatermarkTemplate>,
    settings: PipelineSettings,
    locks: ContentLocks,
}

impl Pipeline {
    pub fn new(
        store: Arc<ImageStore>,
        watermark: Arc<WatermarkTemplate>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            watermark,
            settings,
            locks: ContentLocks::default(),
        }
    }

    pub async fn render(
        &self,
        content_id: &ContentId,
        source_bytes: &[u8],
    ) -> Result<RenderedImage, PipelineError> {
        let guard = Arc::new(self.locks.acquire(content_id).await);

        debug!(content_id = %content_id, stage = %Stage::Store, "entering stage");
        let source_path = self
            .store
            .save(content_id, ArtifactKind::Source, source_bytes)
            .await?;
        let composite_path = self.store.path(content_id, ArtifactKind::Composite);
        let preview_path = self.store.path(content_id, ArtifactKind::Preview);

        let original = {
            let path = source_path.clone();
            self.run_stage(content_id, Stage::Inspect, &guard, move || imaging::inspect(&path))
                .await?
        };

        {
            let path = source_path.clone();
            let max_edge = self.settings.max_edge;
            let quality = self.settings.jpeg_quality;
            self.run_stage(content_id, Stage::Constrain, &guard, move || {
                imaging::enforce_max_edge(&path, max_edge, quality)
            })
            .await?;
        }

        let (source_dims, source_format) = {
            let path = source_path.clone();
            self.run_stage(content_id, Stage::Reinspect, &guard, move || {
                imaging::inspect_with_format(&path)
            })
            .await?
        };

        let watermark = {
            let template = self.watermark.clone();
            self.run_stage(content_id, Stage::FitWatermark, &guard, move || {
                Ok(template.fit(source_dims))
            })
            .await?
        };

        let composite_dims = {
            let source = source_path.clone();
            let out = composite_path.clone();
            let quality = self.settings.jpeg_quality;
            self.run_stage(content_id, Stage::Composite, &guard, move || {
                imaging::composite(&source, source_dims, &watermark, &out, quality)
            })
            .await?
        };

        let preview_dims = {
            let composite = composite_path.clone();
            let preview = preview_path.clone();
            let width = self.settings.preview_width;
            let quality = self.settings.jpeg_quality;
            self.run_stage(content_id, Stage::Preview, &guard, move || {
                imaging::derive_preview(&composite, &preview, width, quality)
            })
            .await?
        };

        info!(
            content_id = %content_id,
            "Rendered {} source (originally {}) into composite {} and preview {}",
            source_dims, original, composite_dims, preview_dims
        );

        Ok(RenderedImage {
            content_id: content_id.clone(),
            source: artifact(source_path, ArtifactKind::Source, source_dims, source_format),
            composite: artifact(
                composite_path,
                ArtifactKind::Composite,
                composite_dims,
                ImageFormat::Jpeg,
            ),
            preview: artifact(
                preview_path,
                ArtifactKind::Preview,
                preview_dims,
                ImageFormat::Jpeg,
            ),
        })
    }

    /// The reply payload pointing at the composite and its preview.
    pub fn reply_messages(&self, rendered: &RenderedImage) -> Vec<Message> {
        let original = self
            .store
            .locate(&rendered.content_id, ArtifactKind::Composite);
        let preview = self
            .store
            .locate(&rendered.content_id, ArtifactKind::Preview);
        vec![Message::image(original.as_str(), preview.as_str())]
    }

    /// Run one image stage on the blocking pool. The task keeps the content
    /// lock alive, so work orphaned by a timeout still finishes before the
    /// next run for the same id starts.
    async fn run_stage<T, F>(
        &self,
        content_id: &ContentId,
        stage: Stage,
        guard: &Arc<OwnedMutexGuard<()>>,
        work: F,
    ) -> Result<T, PipelineError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, ImagingError> + Send + 'static,
    {
        debug!(content_id = %content_id, stage = %stage, "entering stage");
        let timeout = self.settings.transform_timeout;
        let held = Arc::clone(guard);
        let task = tokio::task::spawn_blocking(move || {
            let _held = held;
            work()
        });

        // A timed-out blocking task keeps running to completion; only the
        // request gives up on it.
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(source))) => Err(PipelineError::Image { stage, source }),
            Ok(Err(join_error)) => Err(PipelineError::Join {
                stage,
                message: join_error.to_string(),
            }),
            Err(_) => Err(PipelineError::Timeout { stage, timeout }),
        }
    }
}

fn artifact(
    path: PathBuf,
    kind: ArtifactKind,
    dimensions: Dimensions,
    format: ImageFormat,
) -> ImageArtifact {
    ImageArtifact {
        path,
        kind,
        dimensions,
        format,
    }
}
