use crate::media::MediaKind;

use std::path::{Path, PathBuf};

/// A locally captured photo or voice clip pending upload.
///
/// Immutable: validation produces a new instance carrying the size rather
/// than mutating the capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMedia {
    kind: MediaKind,
    local_path: PathBuf,
    duration_seconds: Option<u64>,
    size_bytes: Option<u64>,
}

impl CapturedMedia {
    /// A finalized voice recording of `duration_seconds`.
    pub fn voice(local_path: impl Into<PathBuf>, duration_seconds: u64) -> Self {
        Self {
            kind: MediaKind::Voice,
            local_path: local_path.into(),
            duration_seconds: Some(duration_seconds),
            size_bytes: None,
        }
    }

    /// A photo acquired from the camera or library.
    pub fn image(local_path: impl Into<PathBuf>) -> Self {
        Self {
            kind: MediaKind::Image,
            local_path: local_path.into(),
            duration_seconds: None,
            size_bytes: None,
        }
    }

    pub(crate) fn with_size(&self, size_bytes: u64) -> Self {
        Self {
            size_bytes: Some(size_bytes),
            ..self.clone()
        }
    }

    /// Media kind.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Local file holding the capture.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Recorded duration. Always `None` for images.
    pub fn duration_seconds(&self) -> Option<u64> {
        self.duration_seconds
    }

    /// File size, populated once the media has been validated.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    /// Whether this instance came out of the validator.
    pub fn is_validated(&self) -> bool {
        self.size_bytes.is_some()
    }

    /// Lowercase extension of the local file, if any.
    pub fn extension(&self) -> Option<String> {
        self.local_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}
