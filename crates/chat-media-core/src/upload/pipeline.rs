use crate::{
    CoreResult, MediaError,
    media::{CapturedMedia, MediaKind},
    provider::{StorageBackend, StoragePath},
    upload::{UploadObserver, UploadResult},
};

use std::{panic::Location, path::Path, sync::Arc};

use error_location::ErrorLocation;
use tracing::{error, info, instrument};

/// Moves validated local files into durable storage.
///
/// Does not validate, retry or time out. Each call writes to a freshly
/// minted [`StoragePath`], so a caller retrying after a failure never
/// collides with a partial object from the earlier attempt.
#[derive(Clone)]
pub struct UploadPipeline {
    storage: Arc<dyn StorageBackend>,
    observer: Option<Arc<dyn UploadObserver>>,
}

impl UploadPipeline {
    /// Create a pipeline writing to `storage`.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            observer: None,
        }
    }

    /// Register upload start/complete/error notifications.
    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Upload a captured media item that already passed validation.
    pub async fn upload_media(&self, media: &CapturedMedia, owner_id: &str) -> UploadResult {
        self.upload(media.local_path(), owner_id, media.kind()).await
    }

    /// Upload `local_path` into the `{owner_id, kind}` namespace.
    #[instrument(skip(self))]
    pub async fn upload(&self, local_path: &Path, owner_id: &str, kind: MediaKind) -> UploadResult {
        if let Some(observer) = &self.observer {
            observer.on_upload_start(kind);
        }

        let result = self.attempt(local_path, owner_id, kind).await;

        match &result {
            Ok(url) => {
                info!(url = %url, kind = %kind, "Upload complete");
                if let Some(observer) = &self.observer {
                    observer.on_upload_complete(url, kind);
                }
            }
            Err(e) => {
                error!(kind = %kind, error = ?e, "Upload failed");
                if let Some(observer) = &self.observer {
                    observer.on_upload_error(kind, &e.message());
                }
            }
        }

        UploadResult::from(result)
    }

    async fn attempt(&self, local_path: &Path, owner_id: &str, kind: MediaKind) -> CoreResult<String> {
        let extension = local_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| kind.default_extension().to_string());

        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| MediaError::IoFailure {
                reason: format!("Failed to read {:?}: {}", local_path, e),
                source: Some(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let path = StoragePath::fresh(owner_id, kind, &extension);
        let size_bytes = bytes.len();

        info!(path = %path, size_bytes, "Uploading media");

        let url = self
            .storage
            .put_object(&path, bytes, kind.content_type(&extension))
            .await?;

        if url.trim().is_empty() {
            return Err(MediaError::StorageRejected {
                reason: format!("Storage returned no URL for {}", path),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(url)
    }
}
