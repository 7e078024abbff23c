use crate::{CoreResult, ErrorKind, MediaError};

/// Outcome of a single upload attempt. Never retried by the pipeline.
#[derive(Debug)]
pub enum UploadResult {
    /// The object is stored and publicly resolvable at `url`.
    Success {
        /// Public URL of the stored object.
        url: String,
    },
    /// The attempt failed; see [`MediaError::kind`] for retry eligibility.
    Failure(MediaError),
}

impl UploadResult {
    /// Whether the attempt succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success { .. })
    }

    /// Public URL on success.
    pub fn url(&self) -> Option<&str> {
        match self {
            UploadResult::Success { url } => Some(url),
            UploadResult::Failure(_) => None,
        }
    }

    /// Failure classification, if the attempt failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            UploadResult::Success { .. } => None,
            UploadResult::Failure(e) => Some(e.kind()),
        }
    }

    /// Convert into a `Result` for `?` propagation.
    pub fn into_result(self) -> CoreResult<String> {
        match self {
            UploadResult::Success { url } => Ok(url),
            UploadResult::Failure(e) => Err(e),
        }
    }
}

impl From<CoreResult<String>> for UploadResult {
    fn from(result: CoreResult<String>) -> Self {
        match result {
            Ok(url) => UploadResult::Success { url },
            Err(e) => UploadResult::Failure(e),
        }
    }
}
