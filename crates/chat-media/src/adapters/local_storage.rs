use chat_media_core::{CoreResult, MediaError, StorageBackend, StoragePath};

use std::{
    io,
    panic::Location,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Filesystem object store laid out as `{root}/{bucket}/{key}`.
///
/// Objects are written to a temp file and renamed into place, so a failed
/// write never leaves a partial object at the final key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    /// Public URL of the object at `path`.
    pub fn url_for(&self, path: &StoragePath) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}/{}", base, path.bucket(), path.key()),
            None => format!("file://{}", self.object_path(path).display()),
        }
    }

    /// Map a URL handed out by [`url_for`](Self::url_for) back to a file.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let base_relative = self
            .public_base_url
            .as_deref()
            .and_then(|base| url.strip_prefix(base));

        if let Some(rest) = base_relative {
            let relative = Path::new(rest.trim_start_matches('/'));
            return is_contained(relative).then(|| self.root.join(relative));
        }

        let path = PathBuf::from(url.strip_prefix("file://")?);
        path.starts_with(&self.root).then_some(path)
    }

    fn object_path(&self, path: &StoragePath) -> PathBuf {
        self.root.join(path.bucket()).join(path.key())
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    #[instrument(skip(self, bytes), fields(size_bytes = bytes.len()))]
    async fn put_object(
        &self,
        path: &StoragePath,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> CoreResult<String> {
        let relative = Path::new(path.bucket()).join(path.key());
        if !is_contained(&relative) {
            return Err(MediaError::StorageRejected {
                reason: format!("Object key escapes the bucket: {}", path),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let target = self.object_path(path);
        let temp = target.with_extension("part");

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(e, "create bucket directory"))?;
        }

        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| storage_error(e, "write object"))?;

        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(storage_error(e, "commit object"));
        }

        debug!(target = ?target, content_type, "Object stored");

        Ok(self.url_for(path))
    }
}

fn is_contained(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

#[track_caller]
fn storage_error(e: io::Error, action: &str) -> MediaError {
    let reason = format!("Failed to {}: {}", action, e);

    match e.kind() {
        io::ErrorKind::PermissionDenied
        | io::ErrorKind::StorageFull
        | io::ErrorKind::QuotaExceeded
        | io::ErrorKind::ReadOnlyFilesystem => MediaError::StorageRejected {
            reason,
            location: ErrorLocation::from(Location::caller()),
        },
        _ => MediaError::NetworkFailure {
            reason,
            location: ErrorLocation::from(Location::caller()),
        },
    }
}
