use error_location::ErrorLocation;
use thiserror::Error;

/// Coarse classification of a [`MediaError`], used by callers to decide
/// whether an action may be retried as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A capture permission was refused.
    PermissionDenied,
    /// The quota gate refused entry into a capture.
    QuotaExceeded,
    /// Captured media failed validation.
    InvalidMedia,
    /// Local read or write failed.
    IoFailure,
    /// Transient transport failure. Retry-eligible.
    NetworkFailure,
    /// The storage backend refused the object. Terminal for that attempt.
    StorageRejected,
    /// Audio playback could not be acquired or failed mid-track.
    PlaybackFailure,
}

impl ErrorKind {
    /// Whether the same action may be retried without caller intervention.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::NetworkFailure)
    }
}

/// Media pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Camera, media library or microphone permission was refused.
    #[error("Capture permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The user has no remaining quota and is not premium.
    #[error("Media quota exhausted ({remaining} of {limit} remaining) {location}")]
    QuotaExceeded {
        /// Remaining sends at the time of the check.
        remaining: u32,
        /// Configured limit for the tier.
        limit: u32,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Captured file is missing, empty, too large or of the wrong type.
    #[error("Invalid media: {reason} {location}")]
    InvalidMedia {
        /// Description of the validation failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Local file system operation failed.
    #[error("IO failure: {reason} {location}")]
    IoFailure {
        /// Description of the failed operation.
        reason: String,
        /// Underlying IO error, if any.
        #[source]
        source: Option<std::io::Error>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transport failure or timeout while talking to the storage backend.
    #[error("Network failure: {reason} {location}")]
    NetworkFailure {
        /// Description of the network failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Storage backend refused the upload (policy, quota, size).
    #[error("Storage rejected upload: {reason} {location}")]
    StorageRejected {
        /// Reason reported by the backend.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio player could not be acquired, resumed or failed during playback.
    #[error("Playback failure: {reason} {location}")]
    PlaybackFailure {
        /// Description of the playback failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl MediaError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            MediaError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            MediaError::InvalidMedia { .. } => ErrorKind::InvalidMedia,
            MediaError::IoFailure { .. } => ErrorKind::IoFailure,
            MediaError::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            MediaError::StorageRejected { .. } => ErrorKind::StorageRejected,
            MediaError::PlaybackFailure { .. } => ErrorKind::PlaybackFailure,
        }
    }

    /// Short human-readable message without the location suffix, suitable
    /// for user-facing notifications.
    pub fn message(&self) -> String {
        match self {
            MediaError::PermissionDenied { .. } => "capture permission denied".to_string(),
            MediaError::QuotaExceeded { limit, .. } => {
                format!("media limit of {} reached", limit)
            }
            MediaError::InvalidMedia { reason, .. }
            | MediaError::IoFailure { reason, .. }
            | MediaError::NetworkFailure { reason, .. }
            | MediaError::StorageRejected { reason, .. }
            | MediaError::PlaybackFailure { reason, .. } => reason.clone(),
        }
    }
}

/// Result type alias using [`MediaError`].
pub type Result<T> = std::result::Result<T, MediaError>;
