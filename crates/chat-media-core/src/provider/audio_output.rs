use crate::CoreResult;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque handle to an acquired audio player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerHandle(Uuid);

impl PlayerHandle {
    /// Allocate a fresh handle identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Handle identity.
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for PlayerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Notification raised by a player while it holds a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Periodic position report. `duration_ms` is `None` until the
    /// resource has worked out the track length.
    Progress {
        /// Current playback position.
        position_ms: u64,
        /// Track length, once known.
        duration_ms: Option<u64>,
    },
    /// The track played to the end.
    Finished,
    /// Playback broke down mid-track.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

/// Progress and completion handlers registered for one acquired player.
///
/// The engine drops the receiving half when it releases the player, so a
/// provider that keeps reporting afterwards is simply ignored.
#[derive(Debug, Clone)]
pub struct PlayerEvents {
    tx: mpsc::UnboundedSender<PlayerEvent>,
}

impl PlayerEvents {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Report the current position. Returns `false` once unregistered.
    pub fn progress(&self, position_ms: u64, duration_ms: Option<u64>) -> bool {
        self.tx
            .send(PlayerEvent::Progress {
                position_ms,
                duration_ms,
            })
            .is_ok()
    }

    /// Report natural completion. Returns `false` once unregistered.
    pub fn finished(&self) -> bool {
        self.tx.send(PlayerEvent::Finished).is_ok()
    }

    /// Report a playback fault. Returns `false` once unregistered.
    pub fn failed(&self, reason: impl Into<String>) -> bool {
        self.tx
            .send(PlayerEvent::Failed {
                reason: reason.into(),
            })
            .is_ok()
    }

    /// Whether the engine has released this player.
    pub fn is_unregistered(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Speaker output for remote voice notes.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Load `url` and start playing it immediately, reporting through `events`.
    async fn acquire_player(&self, url: &str, events: PlayerEvents) -> CoreResult<PlayerHandle>;

    /// Pause without releasing the underlying resource.
    async fn pause(&self, handle: PlayerHandle) -> CoreResult<()>;

    /// Resume a paused player.
    async fn resume(&self, handle: PlayerHandle) -> CoreResult<()>;

    /// Free the player. Called exactly once per acquired handle.
    async fn release(&self, handle: PlayerHandle) -> CoreResult<()>;
}
