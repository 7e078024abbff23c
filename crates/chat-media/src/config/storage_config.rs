use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Local object store standing in for remote storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory buckets are created under.
    pub root_dir: PathBuf,

    /// Prefix of returned URLs (None = `file://` URLs).
    #[serde(default)]
    pub public_base_url: Option<String>,
}
