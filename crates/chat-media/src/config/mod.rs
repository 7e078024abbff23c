mod account_config;
#[allow(clippy::module_inception)]
mod config;
mod media_config;
mod recording_config;
mod storage_config;

pub(crate) use {
    account_config::AccountConfig, config::Config, media_config::MediaConfig,
    recording_config::RecordingConfig, storage_config::StorageConfig,
};

pub(crate) const DEFAULT_MAX_BYTES: u64 = chat_media_core::DEFAULT_MAX_MEDIA_BYTES;
pub(crate) const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_MAX_NOTE_SECONDS: u64 = 300;
pub(crate) const DEFAULT_QUOTA_LIMIT: u32 = 20;

pub(crate) fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

pub(crate) fn default_upload_timeout_secs() -> u64 {
    DEFAULT_UPLOAD_TIMEOUT_SECS
}

pub(crate) fn default_max_note_seconds() -> u64 {
    DEFAULT_MAX_NOTE_SECONDS
}

pub(crate) fn default_quota_limit() -> u32 {
    DEFAULT_QUOTA_LIMIT
}
