/// Where a voice message's player is in its lifecycle.
///
/// `Unloaded -> Loaded -> Playing <-> Paused -> Finished`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// No resource held.
    #[default]
    Unloaded,
    /// Resource acquired, playback about to begin.
    Loaded,
    /// Audio is playing.
    Playing,
    /// Audio is paused; the resource is still held.
    Paused,
    /// The track played to the end and the resource was released.
    Finished,
}

/// Snapshot of one voice message's playback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackState {
    /// Lifecycle status.
    pub status: PlaybackStatus,
    /// Current position. Never past `duration_ms` once the duration is known.
    pub position_ms: u64,
    /// Track length: a caller estimate until `duration_known`, then the
    /// value reported by the resource.
    pub duration_ms: u64,
    /// Whether `duration_ms` came from the resource.
    pub duration_known: bool,
    /// Reason of the last mid-track failure, cleared on the next `play()`.
    pub failure: Option<String>,
}

impl PlaybackState {
    /// Whether a player resource is held in this state.
    pub fn holds_resource(&self) -> bool {
        matches!(
            self.status,
            PlaybackStatus::Loaded | PlaybackStatus::Playing | PlaybackStatus::Paused
        )
    }

    pub(crate) fn apply_progress(&mut self, position_ms: u64, duration_ms: Option<u64>) {
        if let Some(duration_ms) = duration_ms {
            self.duration_ms = duration_ms;
            self.duration_known = true;
        }

        self.position_ms = if self.duration_known {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        };
    }
}
