//! Chat Media Core Library
//!
//! Capture, validation, upload and playback of photos and voice notes in a
//! conversation, written against capability traits so any device or
//! storage backend can be plugged in.
//!
//! # Example
//!
//! ```no_run
//! use chat_media_core::{
//!     AudioOutput, CaptureDevice, CaptureSession, CoreResult, MediaValidator,
//!     PermissionGate, PermissionProvider, PlaybackEngine, StorageBackend, UploadPipeline,
//! };
//!
//! use std::{sync::Arc, time::Duration};
//!
//! async fn record_and_send(
//!     permissions: Arc<dyn PermissionProvider>,
//!     microphone: Arc<dyn CaptureDevice>,
//!     storage: Arc<dyn StorageBackend>,
//!     speaker: Arc<dyn AudioOutput>,
//! ) -> CoreResult<()> {
//!     let session = CaptureSession::new(PermissionGate::new(permissions), microphone);
//!
//!     session.start().await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!
//!     if let Some(note) = session.stop().await? {
//!         let note = MediaValidator::default().validate(&note).await?.into_result()?;
//!         let url = UploadPipeline::new(storage)
//!             .upload_media(&note, "user-1")
//!             .await
//!             .into_result()?;
//!
//!         PlaybackEngine::new(url, speaker).play().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod flow;
mod media;
mod playback;
mod provider;
mod quota;
mod upload;
mod validator;

pub use {
    capture::{
        ActiveRecordingFlag, CaptureSession, ImageCapture, PermissionGate, RecordingState,
        SessionStatus, StartOutcome,
    },
    error::{ErrorKind, MediaError, Result as CoreResult},
    flow::{Delivery, MediaFlow},
    media::{CapturedMedia, MediaKind},
    playback::{PlaybackEngine, PlaybackState, PlaybackStatus},
    provider::{
        AudioOutput, CaptureDevice, ImageSource, Permission, PermissionProvider, Platform,
        PlayerEvent, PlayerEvents, PlayerHandle, RecorderHandle, StorageBackend, StoragePath,
    },
    quota::{QuotaGate, QuotaSnapshot, QuotaSource},
    upload::{UploadObserver, UploadPipeline, UploadResult},
    validator::{DEFAULT_MAX_MEDIA_BYTES, MediaValidator, Validation},
};

#[cfg(test)]
mod tests;
