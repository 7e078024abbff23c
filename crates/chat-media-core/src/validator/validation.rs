use crate::{CoreResult, MediaError, media::CapturedMedia};

use std::panic::Location;

use error_location::ErrorLocation;

/// Outcome of an expected validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The media may be uploaded. Carries a copy with the size filled in.
    Valid(CapturedMedia),
    /// The media must not be uploaded.
    Invalid {
        /// Why the media was rejected.
        reason: String,
    },
}

impl Validation {
    /// Whether the media passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    /// Rejection reason, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Validation::Valid(_) => None,
            Validation::Invalid { reason } => Some(reason),
        }
    }

    /// Turn a rejection into `InvalidMedia`.
    #[track_caller]
    pub fn into_result(self) -> CoreResult<CapturedMedia> {
        match self {
            Validation::Valid(media) => Ok(media),
            Validation::Invalid { reason } => Err(MediaError::InvalidMedia {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
