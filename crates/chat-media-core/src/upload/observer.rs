use crate::media::MediaKind;

/// Fire-and-forget upload notifications for the UI.
///
/// Every method defaults to a no-op so implementors only override what
/// they render.
pub trait UploadObserver: Send + Sync {
    /// An upload attempt began.
    fn on_upload_start(&self, _kind: MediaKind) {}

    /// An upload attempt produced a public URL.
    fn on_upload_complete(&self, _url: &str, _kind: MediaKind) {}

    /// An upload attempt failed.
    fn on_upload_error(&self, _kind: MediaKind, _message: &str) {}
}
