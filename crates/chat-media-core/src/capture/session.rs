use crate::{
    CoreResult, MediaError,
    capture::{ActiveRecordingFlag, PermissionGate, RecordingState, SessionStatus},
    media::CapturedMedia,
    provider::{CaptureDevice, RecorderHandle},
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Duration tick. One tick is one recorded second.
pub(crate) const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Result of a [`CaptureSession::start`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new recording is running.
    Started {
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
    /// The session was not Idle, or another session holds the recording
    /// flag. Nothing changed.
    Ignored,
}

/// Live recorder paired with the task that ticks its duration.
struct ActiveRecording {
    session_id: Uuid,
    handle: RecorderHandle,
    started_at: Instant,
    ticker: JoinHandle<()>,
}

impl ActiveRecording {
    fn stop_ticking(&self) {
        self.ticker.abort();
    }
}

impl SessionInner {
    /// Drop back to Idle, handing back the live recording, if any.
    fn teardown(&mut self) -> Option<ActiveRecording> {
        let active = self.active.take();
        if let Some(active) = &active {
            active.stop_ticking();
        }
        self.state = RecordingState::Idle;
        self.elapsed_seconds = 0;
        active
    }
}

/// Undoes a half-finished [`CaptureSession::start`].
///
/// Armed from the moment the session enters Requesting. If the `start()`
/// future is dropped before Active is committed, `Drop` releases the
/// claimed flag, discards an acquired recorder and resets the state to Idle.
struct StartGuard<'a> {
    session: &'a CaptureSession,
    claimed: bool,
    handle: Option<RecorderHandle>,
    armed: bool,
}

impl<'a> StartGuard<'a> {
    fn new(session: &'a CaptureSession) -> Self {
        Self {
            session,
            claimed: false,
            handle: None,
            armed: true,
        }
    }

    /// Roll back on an error path, back in Idle before returning.
    async fn abandon(mut self) {
        self.armed = false;
        if self.claimed {
            self.session.flag.release();
        }
        self.session.reset_to_idle().await;
    }

    /// Active is committed; nothing left to undo.
    fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        warn!("Start abandoned mid-flight, rolling back");

        if self.claimed {
            self.session.flag.release();
        }

        if let Some(handle) = self.handle.take() {
            let device = Arc::clone(&self.session.device);
            spawn_cleanup(async move {
                if let Err(e) = device.discard(handle).await {
                    warn!(error = ?e, "Failed to discard abandoned recorder");
                }
            });
        }

        let status = Arc::clone(&self.session.status);
        let reset = move |inner: &mut SessionInner| {
            if inner.state == RecordingState::Requesting {
                inner.state = RecordingState::Idle;
                inner.elapsed_seconds = 0;
                publish_to(&status, inner);
            }
        };

        match self.session.inner.try_lock() {
            Ok(mut inner) => reset(&mut *inner),
            Err(_) => {
                let inner = Arc::clone(&self.session.inner);
                spawn_cleanup(async move { reset(&mut *inner.lock().await) });
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct SessionInner {
    state: RecordingState,
    elapsed_seconds: u64,
    active: Option<ActiveRecording>,
}

/// One in-progress voice recording at a time.
///
/// Guards are on the current state, not on the UI: `start()` is only
/// accepted from Idle, `stop()`/`cancel()` only from Active. Every exit path
/// (stop, cancel, finalize failure, acquire failure) lands back in Idle with
/// the recorder handle released.
///
/// # Thread Safety
///
/// State lives behind a `tokio::sync::Mutex`. `start()` drops the lock
/// while the permission prompt is open; the Requesting state keeps
/// concurrent `start()`/`stop()`/`cancel()` calls out in the meantime.
pub struct CaptureSession {
    gate: PermissionGate,
    device: Arc<dyn CaptureDevice>,
    flag: ActiveRecordingFlag,
    inner: Arc<Mutex<SessionInner>>,
    status: Arc<watch::Sender<SessionStatus>>,
}

impl CaptureSession {
    /// Create an Idle session bound to the process-wide recording flag.
    pub fn new(gate: PermissionGate, device: Arc<dyn CaptureDevice>) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());

        Self {
            gate,
            device,
            flag: ActiveRecordingFlag::global(),
            inner: Arc::new(Mutex::new(SessionInner::default())),
            status: Arc::new(status),
        }
    }

    /// Use `flag` instead of the process-wide recording flag.
    pub fn with_flag(mut self, flag: ActiveRecordingFlag) -> Self {
        self.flag = flag;
        self
    }

    /// Latest published status.
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Current state.
    pub fn state(&self) -> RecordingState {
        self.status.borrow().state
    }

    /// Whole seconds recorded by the current session.
    pub fn elapsed_seconds(&self) -> u64 {
        self.status.borrow().elapsed_seconds
    }

    /// Follow state transitions and duration ticks.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Start recording.
    ///
    /// A no-op returning [`StartOutcome::Ignored`] unless the session is
    /// Idle and no other session is recording.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the gate stays closed, or the
    /// device's error when the microphone cannot be opened. The session is
    /// back in Idle in both cases.
    #[instrument(skip(self))]
    pub async fn start(&self) -> CoreResult<StartOutcome> {
        {
            let mut inner = self.inner.lock().await;
            if inner.state != RecordingState::Idle {
                debug!(state = ?inner.state, "Start ignored, session not idle");
                return Ok(StartOutcome::Ignored);
            }
            inner.state = RecordingState::Requesting;
            inner.elapsed_seconds = 0;
            self.publish(&inner);
        }

        let mut guard = StartGuard::new(self);

        if !self.gate.request().await {
            guard.abandon().await;
            return Err(MediaError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !self.flag.try_claim() {
            warn!("Another capture session is recording, start ignored");
            guard.abandon().await;
            return Ok(StartOutcome::Ignored);
        }
        guard.claimed = true;

        match self.device.acquire_recorder().await {
            Ok(handle) => guard.handle = Some(handle),
            Err(e) => {
                guard.abandon().await;
                return Err(e);
            }
        }

        let session_id = Uuid::new_v4();
        let mut inner = self.inner.lock().await;

        let Some(handle) = guard.handle.take() else {
            drop(inner);
            guard.abandon().await;
            return Ok(StartOutcome::Ignored);
        };

        let ticker = spawn_ticker(
            Arc::clone(&self.inner),
            Arc::clone(&self.status),
            session_id,
        );

        inner.state = RecordingState::Active;
        inner.active = Some(ActiveRecording {
            session_id,
            handle,
            started_at: Instant::now(),
            ticker,
        });
        self.publish(&inner);
        guard.commit();

        info!(session_id = %session_id, "Recording started");

        Ok(StartOutcome::Started { session_id })
    }

    /// Stop recording and finalize the file.
    ///
    /// Returns `Ok(None)` when the session was not Active.
    ///
    /// # Errors
    ///
    /// Returns the device's error when finalization fails. The session is
    /// back in Idle either way.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> CoreResult<Option<CapturedMedia>> {
        let mut inner = self.inner.lock().await;

        if inner.state != RecordingState::Active {
            debug!(state = ?inner.state, "Stop ignored, session not active");
            return Ok(None);
        }

        inner.state = RecordingState::Finalizing;
        let elapsed_seconds = inner.elapsed_seconds;
        let active = inner.active.take();
        self.publish(&inner);

        let Some(active) = active else {
            self.finish(&mut inner);
            return Ok(None);
        };
        active.stop_ticking();

        let result = self.device.finalize(active.handle).await;
        self.finish(&mut inner);

        match result {
            Ok(path) => {
                info!(
                    session_id = %active.session_id,
                    elapsed_seconds,
                    wall_ms = active.started_at.elapsed().as_millis(),
                    path = ?path,
                    "Recording finalized"
                );
                Ok(Some(CapturedMedia::voice(path, elapsed_seconds)))
            }
            Err(e) => {
                warn!(session_id = %active.session_id, error = ?e, "Recording failed to finalize");
                Err(e)
            }
        }
    }

    /// Stop recording and throw the audio away.
    ///
    /// Returns `false` when the session was not Active.
    #[instrument(skip(self))]
    pub async fn cancel(&self) -> bool {
        let mut inner = self.inner.lock().await;

        if inner.state != RecordingState::Active {
            debug!(state = ?inner.state, "Cancel ignored, session not active");
            return false;
        }

        inner.state = RecordingState::Cancelled;
        let active = inner.active.take();
        self.publish(&inner);

        if let Some(active) = active {
            active.stop_ticking();
            if let Err(e) = self.device.discard(active.handle).await {
                warn!(session_id = %active.session_id, error = ?e, "Failed to discard recorder");
            }
            info!(session_id = %active.session_id, "Recording cancelled");
        }

        self.finish(&mut inner);

        true
    }

    fn finish(&self, inner: &mut SessionInner) {
        inner.state = RecordingState::Idle;
        inner.elapsed_seconds = 0;
        inner.active = None;
        self.flag.release();
        self.publish(inner);
    }

    async fn reset_to_idle(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = RecordingState::Idle;
        inner.elapsed_seconds = 0;
        self.publish(&inner);
    }

    fn publish(&self, inner: &SessionInner) {
        publish_to(&self.status, inner);
    }

    #[cfg(test)]
    pub(crate) async fn lock_state(&self) -> tokio::sync::OwnedMutexGuard<SessionInner> {
        Arc::clone(&self.inner).lock_owned().await
    }
}

fn publish_to(status: &watch::Sender<SessionStatus>, inner: &SessionInner) {
    status.send_replace(SessionStatus {
        state: inner.state,
        session_id: inner.active.as_ref().map(|a| a.session_id),
        elapsed_seconds: inner.elapsed_seconds,
    });
}

/// Run teardown work on the current runtime, if there is one.
fn spawn_cleanup(work: impl std::future::Future<Output = ()> + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(work);
        }
        Err(_) => warn!("No runtime to finish capture teardown on"),
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let flag = self.flag.clone();
        let device = Arc::clone(&self.device);
        let status = Arc::clone(&self.status);

        let finish = move |inner: &mut SessionInner| {
            let active = inner.teardown()?;
            flag.release();
            publish_to(&status, inner);
            Some(active.handle)
        };

        // The ticker may hold the lock right now; finish on the runtime then.
        let handle = match self.inner.try_lock() {
            Ok(mut inner) => finish(&mut *inner),
            Err(_) => {
                let inner = Arc::clone(&self.inner);
                spawn_cleanup(async move {
                    let handle = finish(&mut *inner.lock().await);
                    if let Some(handle) = handle {
                        discard_on_teardown(device.as_ref(), handle).await;
                    }
                });
                return;
            }
        };

        if let Some(handle) = handle {
            spawn_cleanup(async move { discard_on_teardown(device.as_ref(), handle).await });
        }
    }
}

async fn discard_on_teardown(device: &dyn CaptureDevice, handle: RecorderHandle) {
    if let Err(e) = device.discard(handle).await {
        warn!(error = ?e, "Failed to discard recorder on teardown");
    }
}

fn spawn_ticker(
    inner: Arc<Mutex<SessionInner>>,
    status: Arc<watch::Sender<SessionStatus>>,
    session_id: Uuid,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

        loop {
            interval.tick().await;

            let mut inner = inner.lock().await;
            let current = inner.active.as_ref().map(|a| a.session_id);
            if inner.state != RecordingState::Active || current != Some(session_id) {
                break;
            }

            inner.elapsed_seconds += 1;
            let elapsed_seconds = inner.elapsed_seconds;
            status.send_modify(|s| s.elapsed_seconds = elapsed_seconds);

            debug!(session_id = %session_id, elapsed_seconds, "Recording tick");
        }
    })
}
