use crate::{
    CoreResult, ErrorKind, MediaError,
    playback::{PlaybackState, PlaybackStatus},
    provider::{AudioOutput, PlayerEvent, PlayerEvents, PlayerHandle},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

/// An acquired player and the task consuming its events.
struct LoadedPlayer {
    handle: PlayerHandle,
    listener: JoinHandle<()>,
}

#[derive(Default)]
pub(crate) struct EngineInner {
    state: PlaybackState,
    player: Option<LoadedPlayer>,
}

impl EngineInner {
    /// Detach the held player, if any. The caller releases the handle.
    fn take_player(&mut self) -> Option<PlayerHandle> {
        self.player.take().map(|player| {
            player.listener.abort();
            player.handle
        })
    }
}

/// Playback state machine for one displayed voice message.
///
/// Holds at most one player handle. Pausing keeps the handle so resuming
/// is cheap; finishing, failing, `unload()` and drop release it, exactly
/// once. Position and duration reports flow in from the player through a
/// per-handle event channel that is closed on release.
pub struct PlaybackEngine {
    url: String,
    output: Arc<dyn AudioOutput>,
    inner: Arc<Mutex<EngineInner>>,
    status: Arc<watch::Sender<PlaybackState>>,
}

impl PlaybackEngine {
    /// Create an Unloaded engine for the voice note at `url`.
    pub fn new(url: impl Into<String>, output: Arc<dyn AudioOutput>) -> Self {
        let (status, _) = watch::channel(PlaybackState::default());

        Self {
            url: url.into(),
            output,
            inner: Arc::new(Mutex::new(EngineInner::default())),
            status: Arc::new(status),
        }
    }

    /// Seed a provisional duration, e.g. from the message metadata.
    ///
    /// Overwritten as soon as the player reports the real length.
    pub fn with_estimated_duration(self, duration_ms: u64) -> Self {
        self.status.send_modify(|s| s.duration_ms = duration_ms);
        if let Ok(mut inner) = self.inner.try_lock() {
            inner.state.duration_ms = duration_ms;
        }
        self
    }

    /// Remote URL this engine plays.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Latest published state.
    pub fn state(&self) -> PlaybackState {
        self.status.borrow().clone()
    }

    /// Follow status, position and duration changes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.status.subscribe()
    }

    /// Handle of the currently held player.
    pub async fn handle(&self) -> Option<PlayerHandle> {
        self.inner.lock().await.player.as_ref().map(|p| p.handle)
    }

    /// Start or resume playback.
    ///
    /// From Paused the held player is resumed. From Unloaded or Finished a
    /// fresh player is acquired and starts from the beginning. From Playing
    /// this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackFailure` when the player cannot be acquired or
    /// resumed. The engine is back in Unloaded so the user can retry.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn play(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;

        match inner.state.status {
            PlaybackStatus::Playing | PlaybackStatus::Loaded => {
                debug!("Already playing");
                return Ok(());
            }
            PlaybackStatus::Paused => {
                if let Some(handle) = inner.player.as_ref().map(|p| p.handle) {
                    return match self.output.resume(handle).await {
                        Ok(()) => {
                            inner.state.status = PlaybackStatus::Playing;
                            self.publish(&inner);
                            info!(handle = %handle.id(), "Playback resumed");
                            Ok(())
                        }
                        Err(e) => Err(self.fail(&mut inner, e).await),
                    };
                }
            }
            PlaybackStatus::Unloaded | PlaybackStatus::Finished => {}
        }

        self.release_player(&mut inner).await;

        let (events, rx) = PlayerEvents::channel();
        let handle = match self.output.acquire_player(&self.url, events).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(&mut inner, e).await),
        };

        inner.state.status = PlaybackStatus::Loaded;
        inner.state.position_ms = 0;
        inner.state.failure = None;
        self.publish(&inner);

        let listener = spawn_listener(
            Arc::clone(&self.inner),
            Arc::clone(&self.status),
            Arc::clone(&self.output),
            handle,
            rx,
        );
        inner.player = Some(LoadedPlayer { handle, listener });
        inner.state.status = PlaybackStatus::Playing;
        self.publish(&inner);

        info!(handle = %handle.id(), "Playback started");

        Ok(())
    }

    /// Pause playback, keeping the player for a cheap resume.
    ///
    /// A no-op unless Playing.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackFailure` when the player refuses to pause; the
    /// player is released and the engine is back in Unloaded.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn pause(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.state.status != PlaybackStatus::Playing {
            debug!(status = ?inner.state.status, "Pause ignored, not playing");
            return Ok(());
        }

        let Some(handle) = inner.player.as_ref().map(|p| p.handle) else {
            inner.state.status = PlaybackStatus::Unloaded;
            self.publish(&inner);
            return Ok(());
        };

        match self.output.pause(handle).await {
            Ok(()) => {
                inner.state.status = PlaybackStatus::Paused;
                self.publish(&inner);
                info!(
                    handle = %handle.id(),
                    position_ms = inner.state.position_ms,
                    "Playback paused"
                );
                Ok(())
            }
            Err(e) => Err(self.fail(&mut inner, e).await),
        }
    }

    /// Release the player (navigation away, message scrolled off screen).
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn unload(&self) {
        let mut inner = self.inner.lock().await;
        self.release_player(&mut inner).await;
        inner.state.status = PlaybackStatus::Unloaded;
        inner.state.position_ms = 0;
        self.publish(&inner);
    }

    async fn release_player(&self, inner: &mut EngineInner) {
        if let Some(handle) = inner.take_player() {
            release(self.output.as_ref(), handle).await;
        }
    }

    async fn fail(&self, inner: &mut EngineInner, source: MediaError) -> MediaError {
        self.release_player(inner).await;
        inner.state.status = PlaybackStatus::Unloaded;
        inner.state.position_ms = 0;
        inner.state.failure = Some(source.message());
        self.publish(inner);

        error!(error = ?source, "Playback failed");

        as_playback_failure(source)
    }

    fn publish(&self, inner: &EngineInner) {
        self.status.send_replace(inner.state.clone());
    }

    #[cfg(test)]
    pub(crate) async fn lock_state(&self) -> tokio::sync::OwnedMutexGuard<EngineInner> {
        Arc::clone(&self.inner).lock_owned().await
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(url = %self.url, "No runtime to release player on teardown");
            return;
        };

        let output = Arc::clone(&self.output);

        // The event listener may hold the lock right now; wait for it then.
        match self.inner.try_lock() {
            Ok(mut inner) => {
                if let Some(handle) = inner.take_player() {
                    runtime.spawn(async move { release(output.as_ref(), handle).await });
                }
            }
            Err(_) => {
                let inner = Arc::clone(&self.inner);
                runtime.spawn(async move {
                    let handle = inner.lock().await.take_player();
                    if let Some(handle) = handle {
                        release(output.as_ref(), handle).await;
                    }
                });
            }
        }
    }
}

async fn release(output: &dyn AudioOutput, handle: PlayerHandle) {
    match output.release(handle).await {
        Ok(()) => debug!(handle = %handle.id(), "Player released"),
        Err(e) => warn!(handle = %handle.id(), error = ?e, "Failed to release player"),
    }
}

#[track_caller]
fn as_playback_failure(source: MediaError) -> MediaError {
    if source.kind() == ErrorKind::PlaybackFailure {
        return source;
    }

    MediaError::PlaybackFailure {
        reason: source.message(),
        location: ErrorLocation::from(Location::caller()),
    }
}

fn spawn_listener(
    inner: Arc<Mutex<EngineInner>>,
    status: Arc<watch::Sender<PlaybackState>>,
    output: Arc<dyn AudioOutput>,
    handle: PlayerHandle,
    mut events: mpsc::UnboundedReceiver<PlayerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let mut inner = inner.lock().await;

            if inner.player.as_ref().map(|p| p.handle) != Some(handle) {
                break;
            }

            match event {
                PlayerEvent::Progress {
                    position_ms,
                    duration_ms,
                } => {
                    inner.state.apply_progress(position_ms, duration_ms);
                    status.send_replace(inner.state.clone());
                    debug!(
                        position_ms = inner.state.position_ms,
                        duration_ms = inner.state.duration_ms,
                        "Playback progress"
                    );
                }
                PlayerEvent::Finished => {
                    // Dropping our own JoinHandle detaches rather than aborts.
                    if let Some(player) = inner.player.take() {
                        release(output.as_ref(), player.handle).await;
                    }
                    inner.state.status = PlaybackStatus::Finished;
                    inner.state.position_ms = 0;
                    status.send_replace(inner.state.clone());
                    info!(handle = %handle.id(), "Playback finished");
                    break;
                }
                PlayerEvent::Failed { reason } => {
                    if let Some(player) = inner.player.take() {
                        release(output.as_ref(), player.handle).await;
                    }
                    error!(handle = %handle.id(), reason = %reason, "Playback failed mid-track");
                    inner.state.status = PlaybackStatus::Unloaded;
                    inner.state.position_ms = 0;
                    inner.state.failure = Some(reason);
                    status.send_replace(inner.state.clone());
                    break;
                }
            }
        }
    })
}
