use crate::{
    ErrorKind, ImageCapture, MediaKind, Permission, PermissionGate,
    tests::fakes::{FakeImageSource, FakePermissions},
};

use std::{path::Path, sync::Arc};

/// WHAT: A picked photo becomes image media with no duration
/// WHY: Images skip the session lifecycle entirely
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_picked_photo_when_capturing_then_image_media() {
    // Given: A picker returning a photo
    let capture = ImageCapture::new(PermissionGate::new(Arc::new(FakePermissions::granting())));
    let source = FakeImageSource::picking(Path::new("/photos/cat.jpg"));

    // When: Capturing
    let media = capture.capture(&source).await.unwrap().unwrap();

    // Then: Image kind, no duration, not yet validated
    assert_eq!(media.kind(), MediaKind::Image);
    assert_eq!(media.duration_seconds(), None);
    assert_eq!(media.local_path(), Path::new("/photos/cat.jpg"));
    assert!(!media.is_validated());
}

/// WHAT: Backing out of the picker yields no media and no error
/// WHY: Cancelling is a normal user choice
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_cancelled_picker_when_capturing_then_none() {
    // Given: A picker the user backs out of
    let capture = ImageCapture::new(PermissionGate::new(Arc::new(FakePermissions::granting())));

    // When: Capturing
    let result = capture.capture(&FakeImageSource::cancelling()).await.unwrap();

    // Then: Nothing
    assert!(result.is_none());
}

/// WHAT: A missing microphone grant blocks photo capture too
/// WHY: Permissions are requested together for every media action
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_microphone_denied_when_capturing_photo_then_permission_denied() {
    // Given: Microphone denied
    let capture = ImageCapture::new(PermissionGate::new(Arc::new(FakePermissions::denying(
        Permission::Microphone,
    ))));
    let source = FakeImageSource::picking(Path::new("/photos/cat.jpg"));

    // When: Capturing a photo
    let result = capture.capture(&source).await;

    // Then: PermissionDenied
    assert_eq!(result.unwrap_err().kind(), ErrorKind::PermissionDenied);
}
