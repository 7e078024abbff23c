use crate::{
    ErrorKind, MediaKind, UploadPipeline,
    tests::fakes::{FakeStorage, RecordingObserver, network_failure, storage_rejected},
};

use std::sync::Arc;

use tempfile::TempDir;

/// WHAT: A successful upload returns a URL in the owner's namespace
/// WHY: Receivers resolve the message by this URL
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_voice_file_when_uploading_then_url_in_owner_namespace() {
    // Given: A local voice note and working storage
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("note.m4a");
    std::fs::write(&path, vec![3u8; 512]).unwrap();
    let storage = Arc::new(FakeStorage::new());
    let pipeline = UploadPipeline::new(Arc::clone(&storage) as _);

    // When: Uploading
    let result = pipeline.upload(&path, "user-42", MediaKind::Voice).await;

    // Then: Non-empty URL under voice-messages/user-42/
    let url = result.url().unwrap();
    assert!(url.starts_with("https://storage.test/voice-messages/user-42/"));
    assert!(url.ends_with(".m4a"));

    let stored = storage.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].path.owner_id(), "user-42");
    assert_eq!(stored[0].size_bytes, 512);
    assert_eq!(stored[0].content_type, "audio/mp4");
}

/// WHAT: Observers see start then complete on success
/// WHY: The UI shows progress while the upload is awaited
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_observer_when_upload_succeeds_then_start_and_complete_notified() {
    // Given: A pipeline with an observer
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.png");
    std::fs::write(&path, vec![9u8; 64]).unwrap();
    let observer = Arc::new(RecordingObserver::default());
    let pipeline = UploadPipeline::new(Arc::new(FakeStorage::new()))
        .with_observer(Arc::clone(&observer) as _);

    // When: Uploading
    let result = pipeline.upload(&path, "u1", MediaKind::Image).await;

    // Then: start, complete(url)
    let url = result.into_result().unwrap();
    assert_eq!(
        observer.events(),
        vec!["start:image".to_string(), format!("complete:image:{}", url)]
    );
}

/// WHAT: A network failure is returned typed, and a retry uses a fresh path
/// WHY: Retries must never collide with a partial object
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_network_failure_when_retrying_then_second_attempt_succeeds_at_new_path() {
    // Given: Storage failing the first attempt only
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("note.m4a");
    std::fs::write(&path, vec![3u8; 128]).unwrap();
    let storage = Arc::new(FakeStorage::new().failing_with(network_failure("connection reset")));
    let observer = Arc::new(RecordingObserver::default());
    let pipeline = UploadPipeline::new(Arc::clone(&storage) as _)
        .with_observer(Arc::clone(&observer) as _);

    // When: Uploading, then retrying
    let first = pipeline.upload(&path, "u1", MediaKind::Voice).await;
    let second = pipeline.upload(&path, "u1", MediaKind::Voice).await;

    // Then: First failed retryably, second succeeded, paths differ
    assert_eq!(first.error_kind(), Some(ErrorKind::NetworkFailure));
    assert!(ErrorKind::NetworkFailure.is_retryable());
    assert!(second.is_success());

    let attempts = storage.attempts();
    assert_eq!(attempts.len(), 2);
    assert_ne!(attempts[0], attempts[1]);
    assert_eq!(storage.stored().len(), 1);
    assert_eq!(observer.events()[1], "error:voice:connection reset");
}

/// WHAT: A policy refusal surfaces as StorageRejected
/// WHY: Not retryable without caller intervention
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_rejecting_storage_when_uploading_then_storage_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.jpg");
    std::fs::write(&path, vec![1u8; 32]).unwrap();
    let pipeline = UploadPipeline::new(Arc::new(
        FakeStorage::new().failing_with(storage_rejected("bucket quota exceeded")),
    ));

    let result = pipeline.upload(&path, "u1", MediaKind::Image).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::StorageRejected));
    assert!(!ErrorKind::StorageRejected.is_retryable());
}

/// WHAT: An unreadable local file fails with IoFailure before storage is hit
/// WHY: Nothing should be written remotely without the bytes in hand
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_local_file_when_uploading_then_io_failure_and_no_attempt() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FakeStorage::new());
    let pipeline = UploadPipeline::new(Arc::clone(&storage) as _);

    let result = pipeline
        .upload(&dir.path().join("gone.m4a"), "u1", MediaKind::Voice)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::IoFailure));
    assert!(storage.attempts().is_empty());
}

/// WHAT: A backend that answers without a URL is treated as a rejection
/// WHY: A message must never be sent with an empty media URL
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_backend_returning_empty_url_when_uploading_then_storage_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("note.m4a");
    std::fs::write(&path, vec![1u8; 8]).unwrap();
    let pipeline = UploadPipeline::new(Arc::new(FakeStorage::new().returning_empty_url()));

    let result = pipeline.upload(&path, "u1", MediaKind::Voice).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::StorageRejected));
}
