use crate::{
    CoreResult, MediaError, capture::PermissionGate, media::CapturedMedia, provider::ImageSource,
};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};

/// Single-step photo capture. No session, no duration.
#[derive(Clone)]
pub struct ImageCapture {
    gate: PermissionGate,
}

impl ImageCapture {
    /// Create an image capture guarded by `gate`.
    pub fn new(gate: PermissionGate) -> Self {
        Self { gate }
    }

    /// Take or pick one photo from `source`.
    ///
    /// Returns `Ok(None)` when the user cancelled the picker.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the gate stays closed, or the
    /// source's error when it fails to produce a file.
    #[instrument(skip_all)]
    pub async fn capture(&self, source: &dyn ImageSource) -> CoreResult<Option<CapturedMedia>> {
        if !self.gate.request().await {
            return Err(MediaError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        match source.acquire_image().await? {
            Some(path) => {
                info!(path = ?path, "Image acquired");
                Ok(Some(CapturedMedia::image(path)))
            }
            None => {
                info!("Image capture cancelled");
                Ok(None)
            }
        }
    }
}
