use crate::{CoreResult, media::MediaKind};

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use uuid::Uuid;

/// Destination of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath {
    bucket: String,
    key: String,
}

impl StoragePath {
    /// A fresh destination under `{bucket(kind)}/{owner_id}/`.
    ///
    /// Never reused across attempts: every call mints a new key.
    pub fn fresh(owner_id: &str, kind: MediaKind, extension: &str) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        Self {
            bucket: kind.bucket().to_string(),
            key: format!("{}/{}-{}.{}", owner_id, millis, Uuid::new_v4(), extension),
        }
    }

    /// Bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key inside the bucket.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Owner namespace, the first key segment.
    pub fn owner_id(&self) -> &str {
        self.key.split('/').next().unwrap_or_default()
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Durable object storage.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write `bytes` at `path` and return the public URL of the object.
    ///
    /// Transport failures must map to `NetworkFailure`, policy refusals to
    /// `StorageRejected`.
    async fn put_object(
        &self,
        path: &StoragePath,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> CoreResult<String>;
}
