use chat_media_core::{MediaKind, UploadObserver};

use tracing::{error, info};

/// Logs upload progress.
pub struct ConsoleObserver;

impl UploadObserver for ConsoleObserver {
    fn on_upload_start(&self, kind: MediaKind) {
        info!(kind = %kind, "Uploading");
    }

    fn on_upload_complete(&self, url: &str, kind: MediaKind) {
        info!(kind = %kind, url, "Upload finished");
    }

    fn on_upload_error(&self, kind: MediaKind, message: &str) {
        error!(kind = %kind, message, "Upload failed");
    }
}
