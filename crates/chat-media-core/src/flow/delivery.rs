use crate::{media::CapturedMedia, upload::UploadResult};

/// A validated capture and the outcome of uploading it.
///
/// On failure the caller keeps `media` and may hand it back to
/// [`MediaFlow::retry_upload`](crate::MediaFlow::retry_upload).
#[derive(Debug)]
pub struct Delivery {
    /// The validated capture.
    pub media: CapturedMedia,
    /// Outcome of the upload attempt.
    pub result: UploadResult,
}

impl Delivery {
    /// Public URL, when the upload succeeded.
    pub fn url(&self) -> Option<&str> {
        self.result.url()
    }

    /// Whether the media reached storage.
    pub fn is_sent(&self) -> bool {
        self.result.is_success()
    }
}
