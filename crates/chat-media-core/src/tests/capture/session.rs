use crate::{
    ActiveRecordingFlag, CaptureSession, ErrorKind, MediaKind, Permission, PermissionGate,
    RecordingState, StartOutcome,
    tests::fakes::{FakeMicrophone, FakePermissions},
};

use std::{sync::Arc, time::Duration};

use tempfile::TempDir;

fn session_with(
    permissions: FakePermissions,
    microphone: &Arc<FakeMicrophone>,
) -> CaptureSession {
    CaptureSession::new(
        PermissionGate::new(Arc::new(permissions)),
        Arc::clone(microphone) as _,
    )
    .with_flag(ActiveRecordingFlag::new())
}

/// WHAT: stop() before any start() is a harmless no-op
/// WHY: Rapid UI input can deliver a stop without a matching start
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_session_when_stopping_then_nothing_happens() {
    // Given: A fresh Idle session
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let session = session_with(FakePermissions::granting(), &microphone);

    // When: Stopping and cancelling without a start
    let stopped = session.stop().await;
    let cancelled = session.cancel().await;

    // Then: No media, no error, no recorder touched
    assert!(matches!(stopped, Ok(None)));
    assert!(!cancelled);
    assert_eq!(session.state(), RecordingState::Idle);
    assert_eq!(microphone.acquired(), 0);
}

/// WHAT: Permission denial leaves the session Idle with nothing recorded
/// WHY: The user must be able to retry immediately after granting access
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_denied_microphone_when_starting_then_idle_with_zero_elapsed() {
    // Given: A platform refusing the microphone
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let session = session_with(FakePermissions::denying(Permission::Microphone), &microphone);

    // When: Starting
    let result = session.start().await;

    // Then: PermissionDenied, Idle, nothing acquired, nothing to stop
    assert_eq!(
        result.unwrap_err().kind(),
        ErrorKind::PermissionDenied
    );
    assert_eq!(session.state(), RecordingState::Idle);
    assert_eq!(session.elapsed_seconds(), 0);
    assert_eq!(microphone.acquired(), 0);
    assert!(matches!(session.stop().await, Ok(None)));
}

/// WHAT: Three elapsed seconds produce a three second voice note
/// WHY: Duration shown to the receiver comes from the live tick count
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_three_ticks_when_stopping_then_duration_is_three_seconds() {
    // Given: An active recording
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let session = session_with(FakePermissions::granting(), &microphone);
    let outcome = session.start().await.unwrap();
    assert!(matches!(outcome, StartOutcome::Started { .. }));
    assert_eq!(session.state(), RecordingState::Active);

    // When: 3.5 seconds pass and the user stops
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(session.elapsed_seconds(), 3);
    let media = session.stop().await.unwrap().unwrap();

    // Then: Voice media of 3 seconds, session back to Idle
    assert_eq!(media.kind(), MediaKind::Voice);
    assert_eq!(media.duration_seconds(), Some(3));
    assert!(media.local_path().exists());
    assert_eq!(session.state(), RecordingState::Idle);
    assert_eq!(microphone.live(), 0);
}

/// WHAT: The tick stops as soon as the session leaves Active
/// WHY: A stale timer must not keep counting into the next recording
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stopped_session_when_time_passes_then_elapsed_stays_zero() {
    // Given: A recording stopped after two seconds
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let session = session_with(FakePermissions::granting(), &microphone);
    session.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    session.stop().await.unwrap();

    // When: More time passes
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Then: Nothing ticks
    assert_eq!(session.elapsed_seconds(), 0);

    // And: A new recording counts from zero
    session.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(session.elapsed_seconds(), 1);
}

/// WHAT: A second start while Active is ignored
/// WHY: Double taps must not open a second recorder
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_active_session_when_starting_again_then_ignored() {
    // Given: An active recording
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let session = session_with(FakePermissions::granting(), &microphone);
    session.start().await.unwrap();

    // When: Starting again
    let outcome = session.start().await.unwrap();

    // Then: Ignored, still one recorder
    assert_eq!(outcome, StartOutcome::Ignored);
    assert_eq!(microphone.acquired(), 1);
    assert_eq!(session.state(), RecordingState::Active);
}

/// WHAT: Cancel discards the recorder without producing media
/// WHY: Cancelled voice notes must never reach the upload pipeline
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_active_session_when_cancelling_then_recorder_discarded() {
    // Given: An active recording
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let session = session_with(FakePermissions::granting(), &microphone);
    session.start().await.unwrap();

    // When: Cancelling
    let cancelled = session.cancel().await;

    // Then: Discarded, never finalized, Idle
    assert!(cancelled);
    assert_eq!(microphone.discarded(), 1);
    assert_eq!(microphone.finalized(), 0);
    assert_eq!(session.state(), RecordingState::Idle);
    assert_eq!(session.elapsed_seconds(), 0);
}

/// WHAT: A finalize failure is surfaced and the session returns to Idle
/// WHY: The UI must never be stuck showing Finalizing
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_encoder_when_stopping_then_error_and_idle() {
    // Given: A recorder whose finalize fails
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    microphone.fail_finalize(true);
    let session = session_with(FakePermissions::granting(), &microphone);
    session.start().await.unwrap();

    // When: Stopping
    let result = session.stop().await;

    // Then: IoFailure, Idle, and a retry can start again
    assert_eq!(result.unwrap_err().kind(), ErrorKind::IoFailure);
    assert_eq!(session.state(), RecordingState::Idle);

    microphone.fail_finalize(false);
    let outcome = session.start().await.unwrap();
    assert!(matches!(outcome, StartOutcome::Started { .. }));
}

/// WHAT: A microphone that cannot be opened leaves the session Idle
/// WHY: Acquire failures must not leave Requesting behind
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_busy_microphone_when_starting_then_error_and_idle() {
    // Given: A microphone that refuses to open
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    microphone.fail_acquire(true);
    let flag = ActiveRecordingFlag::new();
    let session = CaptureSession::new(
        PermissionGate::new(Arc::new(FakePermissions::granting())),
        Arc::clone(&microphone) as _,
    )
    .with_flag(flag.clone());

    // When: Starting
    let result = session.start().await;

    // Then: Error surfaced, Idle, flag free
    assert_eq!(result.unwrap_err().kind(), ErrorKind::IoFailure);
    assert_eq!(session.state(), RecordingState::Idle);
    assert!(!flag.is_claimed());
}

/// WHAT: Two sessions sharing a flag never record at the same time
/// WHY: At most one recording may be active process-wide
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_shared_flag_when_second_session_starts_then_ignored_until_first_stops() {
    // Given: Two sessions on one flag, the first recording
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let flag = ActiveRecordingFlag::new();
    let first = session_with(FakePermissions::granting(), &microphone).with_flag(flag.clone());
    let second = session_with(FakePermissions::granting(), &microphone).with_flag(flag.clone());
    first.start().await.unwrap();

    // When: The second session starts
    let blocked = second.start().await.unwrap();

    // Then: Ignored and left Idle
    assert_eq!(blocked, StartOutcome::Ignored);
    assert_eq!(second.state(), RecordingState::Idle);

    // And: Once the first stops, the second may record
    first.stop().await.unwrap();
    let started = second.start().await.unwrap();
    assert!(matches!(started, StartOutcome::Started { .. }));
    assert!(flag.is_claimed());
}

/// WHAT: Arbitrary start/stop/cancel sequences never hold two recorders
/// WHY: Active must never be entered twice without an intervening Idle
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_random_command_sequence_when_applied_then_at_most_one_live_recorder() {
    // Given: A session and a pseudo-random command stream
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let session = session_with(FakePermissions::granting(), &microphone);
    let mut seed: u32 = 0x2545_F491;

    // When/Then: After every command there is at most one live recorder,
    // and exactly one while Active
    for _ in 0..200 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;

        match seed % 3 {
            0 => {
                session.start().await.unwrap();
            }
            1 => {
                session.stop().await.unwrap();
            }
            _ => {
                session.cancel().await;
            }
        }

        let live = microphone.live();
        assert!(live <= 1);
        assert_eq!(live == 1, session.state() == RecordingState::Active);
    }
}

/// WHAT: A start() dropped while the permission prompt is open rolls back
/// WHY: A caller timing out the prompt must not wedge the session in Requesting
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_slow_permission_prompt_when_start_times_out_then_idle_and_restartable() {
    // Given: A prompt that takes ten seconds to answer
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let flag = ActiveRecordingFlag::new();
    let permissions = FakePermissions::granting().with_delay(Duration::from_secs(10));
    let session = session_with(permissions, &microphone).with_flag(flag.clone());

    // When: The caller gives up after half a second
    let timed_out = tokio::time::timeout(Duration::from_millis(500), session.start()).await;

    // Then: Back in Idle with the flag free and no recorder opened
    assert!(timed_out.is_err());
    assert_eq!(session.state(), RecordingState::Idle);
    assert!(!flag.is_claimed());
    assert_eq!(microphone.acquired(), 0);

    // And: A later start goes through
    let outcome = session.start().await.unwrap();
    assert!(matches!(outcome, StartOutcome::Started { .. }));
    assert!(flag.is_claimed());
}

/// WHAT: A start() dropped while the microphone opens releases the shared flag
/// WHY: A leaked claim would block every other session for the process lifetime
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_slow_microphone_when_start_times_out_then_flag_released_for_fresh_session() {
    // Given: A microphone that takes ten seconds to open, behind a shared flag
    let dir = TempDir::new().unwrap();
    let slow = Arc::new(FakeMicrophone::new(dir.path()).with_acquire_delay(Duration::from_secs(10)));
    let flag = ActiveRecordingFlag::new();
    let session = session_with(FakePermissions::granting(), &slow).with_flag(flag.clone());

    // When: The caller gives up mid-acquire and drops the session
    let timed_out = tokio::time::timeout(Duration::from_millis(500), session.start()).await;
    assert!(timed_out.is_err());
    assert_eq!(session.state(), RecordingState::Idle);
    drop(session);

    // Then: The flag is free and a fresh session on it records
    assert!(!flag.is_claimed());
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let fresh = session_with(FakePermissions::granting(), &microphone).with_flag(flag.clone());
    let outcome = fresh.start().await.unwrap();
    assert!(matches!(outcome, StartOutcome::Started { .. }));
    assert_eq!(slow.live(), 0);
}

/// WHAT: Dropping an Active session discards its recorder and frees the flag
/// WHY: A conversation closed mid-recording must not keep the microphone open
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_active_session_when_dropped_then_recorder_discarded_and_flag_released() {
    // Given: An active recording on a shared flag
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let flag = ActiveRecordingFlag::new();
    let session = session_with(FakePermissions::granting(), &microphone).with_flag(flag.clone());
    session.start().await.unwrap();

    // When: The session is dropped
    drop(session);
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Then: Recorder discarded, flag free
    assert_eq!(microphone.discarded(), 1);
    assert_eq!(microphone.live(), 0);
    assert!(!flag.is_claimed());
}

/// WHAT: Dropping a session while its state lock is held still tears it down
/// WHY: The duration ticker may hold the lock at the moment the session goes away
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_locked_state_when_session_dropped_then_teardown_finishes_after_unlock() {
    // Given: An active recording whose state lock is held elsewhere
    let dir = TempDir::new().unwrap();
    let microphone = Arc::new(FakeMicrophone::new(dir.path()));
    let flag = ActiveRecordingFlag::new();
    let session = session_with(FakePermissions::granting(), &microphone).with_flag(flag.clone());
    session.start().await.unwrap();
    let held = session.lock_state().await;

    // When: The session is dropped, then the lock is let go
    drop(session);
    assert!(flag.is_claimed());
    drop(held);
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Then: Recorder discarded and a fresh session on the same flag records
    assert_eq!(microphone.discarded(), 1);
    assert!(!flag.is_claimed());
    let fresh = session_with(FakePermissions::granting(), &microphone).with_flag(flag.clone());
    let outcome = fresh.start().await.unwrap();
    assert!(matches!(outcome, StartOutcome::Started { .. }));
}
