use crate::{CoreResult, MediaError, media::CapturedMedia, validator::Validation};

use std::{io, panic::Location};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Shared per-kind size ceiling (10 MiB).
pub const DEFAULT_MAX_MEDIA_BYTES: u64 = 10 * 1024 * 1024;

/// Pre-upload checks on a captured file. Reads metadata only.
#[derive(Debug, Clone, Copy)]
pub struct MediaValidator {
    max_bytes: u64,
}

impl Default for MediaValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MEDIA_BYTES)
    }
}

impl MediaValidator {
    /// Create a validator with a byte ceiling shared by images and voice.
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Configured ceiling.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check that the file exists, is readable, non-empty, under the
    /// ceiling and of a type declared for its kind.
    ///
    /// # Errors
    ///
    /// Only unexpected I/O faults are errors (`IoFailure`). Every expected
    /// rejection is reported as [`Validation::Invalid`].
    #[instrument(skip(self, media), fields(kind = %media.kind(), path = ?media.local_path()))]
    pub async fn validate(&self, media: &CapturedMedia) -> CoreResult<Validation> {
        let path = media.local_path();

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => return rejection_or_fault(e, "file does not exist"),
        };

        if !metadata.is_file() {
            return Ok(invalid("not a regular file"));
        }

        let size_bytes = metadata.len();

        if size_bytes == 0 {
            return Ok(invalid("file is empty"));
        }

        if size_bytes > self.max_bytes {
            return Ok(invalid(format!(
                "file is {} bytes, limit is {} bytes",
                size_bytes, self.max_bytes
            )));
        }

        match media.extension() {
            Some(ext) if media.kind().accepts_extension(&ext) => {}
            Some(ext) => {
                return Ok(invalid(format!(
                    "'.{}' is not an accepted {} type",
                    ext,
                    media.kind()
                )));
            }
            None => return Ok(invalid("file has no extension")),
        }

        if let Err(e) = tokio::fs::File::open(path).await {
            return rejection_or_fault(e, "file does not exist");
        }

        debug!(size_bytes, "Media validated");

        Ok(Validation::Valid(media.with_size(size_bytes)))
    }
}

fn invalid(reason: impl Into<String>) -> Validation {
    let reason = reason.into();
    info!(reason = %reason, "Media rejected");
    Validation::Invalid { reason }
}

#[track_caller]
fn rejection_or_fault(e: io::Error, missing: &str) -> CoreResult<Validation> {
    match e.kind() {
        io::ErrorKind::NotFound => Ok(invalid(missing)),
        io::ErrorKind::PermissionDenied => Ok(invalid("file is not readable")),
        _ => Err(MediaError::IoFailure {
            reason: format!("Failed to read file metadata: {}", e),
            source: Some(e),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
