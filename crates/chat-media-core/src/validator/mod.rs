mod media_validator;
mod validation;

pub use {
    media_validator::{DEFAULT_MAX_MEDIA_BYTES, MediaValidator},
    validation::Validation,
};
