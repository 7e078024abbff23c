use crate::config::{default_max_bytes, default_upload_timeout_secs};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Validation and upload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Byte ceiling shared by photos and voice notes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Give up on an upload after this many seconds.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

impl MediaConfig {
    /// Caller-side upload timeout.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            upload_timeout_secs: default_upload_timeout_secs(),
        }
    }
}
