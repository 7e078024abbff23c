use crate::config::default_max_note_seconds;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where finalized voice notes are written before upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Output directory for WAV files.
    pub output_dir: PathBuf,

    /// Longest voice note the recorder buffers. Longer notes fail to finalize.
    #[serde(default = "default_max_note_seconds")]
    pub max_seconds: u64,
}
