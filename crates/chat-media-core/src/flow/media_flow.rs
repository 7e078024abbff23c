use crate::{
    CoreResult, MediaError,
    capture::{CaptureSession, ImageCapture, RecordingState, StartOutcome},
    flow::Delivery,
    media::CapturedMedia,
    provider::ImageSource,
    quota::QuotaGate,
    upload::{UploadPipeline, UploadResult},
    validator::MediaValidator,
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Drives a capture from the quota check through to a stored URL.
///
/// `quota -> capture -> validate -> upload`. Quota, permission and
/// validation failures stop the flow before the next stage and are returned
/// as errors. Upload failures come back inside the [`Delivery`] so the
/// caller can decide whether to retry.
pub struct MediaFlow {
    quota: QuotaGate,
    session: CaptureSession,
    images: ImageCapture,
    validator: MediaValidator,
    pipeline: UploadPipeline,
    upload_timeout: Option<Duration>,
}

impl MediaFlow {
    /// Assemble a flow from its stages.
    pub fn new(
        quota: QuotaGate,
        session: CaptureSession,
        images: ImageCapture,
        validator: MediaValidator,
        pipeline: UploadPipeline,
    ) -> Self {
        Self {
            quota,
            session,
            images,
            validator,
            pipeline,
            upload_timeout: None,
        }
    }

    /// Give up on an upload after `timeout`, reporting `NetworkFailure`.
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = Some(timeout);
        self
    }

    /// The voice capture session, for status observation.
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Check the quota, then start recording a voice note.
    ///
    /// # Errors
    ///
    /// `QuotaExceeded` leaves the session untouched in Idle. Otherwise see
    /// [`CaptureSession::start`].
    #[instrument(skip(self))]
    pub async fn begin_voice_note(&self, owner_id: &str) -> CoreResult<StartOutcome> {
        if self.session.state() != RecordingState::Idle {
            return Ok(StartOutcome::Ignored);
        }

        self.quota.admit(owner_id).await?;
        self.session.start().await
    }

    /// Stop recording, validate the file and upload it.
    ///
    /// Returns `Ok(None)` when nothing was recording.
    #[instrument(skip(self))]
    pub async fn finish_voice_note(&self, owner_id: &str) -> CoreResult<Option<Delivery>> {
        let Some(media) = self.session.stop().await? else {
            return Ok(None);
        };

        self.deliver(media, owner_id).await.map(Some)
    }

    /// Discard the recording in progress.
    pub async fn cancel_voice_note(&self) -> bool {
        self.session.cancel().await
    }

    /// Check the quota, take or pick a photo from `source` and upload it.
    ///
    /// Returns `Ok(None)` when the user cancelled the picker.
    #[instrument(skip(self, source))]
    pub async fn send_photo(
        &self,
        owner_id: &str,
        source: &dyn ImageSource,
    ) -> CoreResult<Option<Delivery>> {
        self.quota.admit(owner_id).await?;

        let Some(media) = self.images.capture(source).await? else {
            return Ok(None);
        };

        self.deliver(media, owner_id).await.map(Some)
    }

    /// Upload `media` again after a failed delivery.
    ///
    /// The pipeline mints a fresh storage path, so the earlier attempt's
    /// partial object is never touched.
    #[instrument(skip(self, media), fields(kind = %media.kind()))]
    pub async fn retry_upload(&self, media: CapturedMedia, owner_id: &str) -> CoreResult<Delivery> {
        info!("Retrying upload");
        self.deliver(media, owner_id).await
    }

    async fn deliver(&self, media: CapturedMedia, owner_id: &str) -> CoreResult<Delivery> {
        let media = if media.is_validated() {
            media
        } else {
            self.validator.validate(&media).await?.into_result()?
        };

        let result = self.upload(&media, owner_id).await;

        Ok(Delivery { media, result })
    }

    async fn upload(&self, media: &CapturedMedia, owner_id: &str) -> UploadResult {
        let upload = self.pipeline.upload_media(media, owner_id);

        let Some(timeout) = self.upload_timeout else {
            return upload.await;
        };

        match tokio::time::timeout(timeout, upload).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis(), "Upload timed out");
                UploadResult::Failure(MediaError::NetworkFailure {
                    reason: format!("Upload timed out after {}s", timeout.as_secs()),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}
