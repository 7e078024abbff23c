use crate::CoreResult;

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

/// Opaque handle to a live recorder owned by a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecorderHandle(Uuid);

impl RecorderHandle {
    /// Allocate a fresh handle identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Handle identity.
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for RecorderHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Microphone recorder.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Open the microphone and start writing audio.
    async fn acquire_recorder(&self) -> CoreResult<RecorderHandle>;

    /// Stop the recorder and turn it into a finished local file.
    ///
    /// The handle is consumed whether or not finalization succeeds.
    async fn finalize(&self, handle: RecorderHandle) -> CoreResult<PathBuf>;

    /// Stop the recorder and throw the captured audio away.
    async fn discard(&self, handle: RecorderHandle) -> CoreResult<()>;
}

/// Camera or photo-library picker.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Take or pick a single photo.
    ///
    /// Returns `Ok(None)` when the user backed out.
    async fn acquire_image(&self) -> CoreResult<Option<PathBuf>>;
}
