use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::imaging::ArtifactKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid content id: {0:?}")]
    InvalidContentId(String),

    #[error("Invalid public URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Opaque key for one image subject: a platform user id or message id.
///
/// Ids become part of file names, so only ASCII letters, digits, `-` and `_`
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Result<Self, StoreError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id.len() <= 128
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(id))
        } else {
            Err(StoreError::InvalidContentId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-subject image files on disk plus the public URLs they are served at.
#[derive(Debug, Clone)]
pub struct ImageStore {
    directory: PathBuf,
    public_base: Url,
}

impl ImageStore {
    /// `base_url` is the public origin of the service and `url_prefix` the
    /// path the storage directory is served under, e.g. `/downloaded`.
    pub fn new(
        directory: impl Into<PathBuf>,
        base_url: &str,
        url_prefix: &str,
    ) -> Result<Self, StoreError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let prefix = url_prefix.trim_matches('/');
        let public_base = if prefix.is_empty() {
            base
        } else {
            base.join(&format!("{}/", prefix))?
        };

        Ok(Self {
            directory: directory.into(),
            public_base,
        })
    }

    pub fn file_name(content_id: &ContentId, kind: ArtifactKind) -> String {
        format!("{}-{}.{}", content_id, kind.file_suffix(), kind.extension())
    }

    pub fn path(&self, content_id: &ContentId, kind: ArtifactKind) -> PathBuf {
        self.directory.join(Self::file_name(content_id, kind))
    }

    /// Write `bytes` as the `kind` artifact of `content_id`, replacing any
    /// previous file. The storage directory must already exist.
    ///
    /// The bytes go to a hidden sibling first and are renamed into place, so
    /// a reader sees either the previous file or the new one.
    pub async fn save(
        &self,
        content_id: &ContentId,
        kind: ArtifactKind,
        bytes: &[u8],
    ) -> Result<PathBuf, StoreError> {
        let file_name = Self::file_name(content_id, kind);
        let path = self.directory.join(&file_name);
        let temp_path = self.directory.join(format!(".{}.tmp", file_name));

        tokio::fs::write(&temp_path, bytes).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!("Stored {} bytes at {:?}", bytes.len(), path);
        Ok(path)
    }

    /// Public URL of an artifact, stamped with the current time so caches
    /// never serve an earlier version of an overwritten file.
    pub fn locate(&self, content_id: &ContentId, kind: ArtifactKind) -> Url {
        self.locate_at(content_id, kind, Utc::now().timestamp_millis())
    }

    pub fn locate_at(&self, content_id: &ContentId, kind: ArtifactKind, epoch_ms: i64) -> Url {
        let mut url = self.public_base.clone();
        // http(s) base URLs always have path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&Self::file_name(content_id, kind));
        }
        url.set_query(Some(&format!("date={}", epoch_ms)));
        url
    }
}
