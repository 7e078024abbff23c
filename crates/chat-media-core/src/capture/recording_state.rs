use uuid::Uuid;

/// Lifecycle of a voice recording.
///
/// `Idle -> Requesting -> Active -> {Finalizing, Cancelled} -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Not recording. The only state `start()` is accepted from.
    #[default]
    Idle,
    /// Waiting for the permission prompt and the microphone.
    Requesting,
    /// Microphone open, duration ticking.
    Active,
    /// Turning the live recorder into a file.
    Finalizing,
    /// Recorder discarded; about to return to Idle.
    Cancelled,
}

/// Snapshot published to observers on every transition and tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    /// Current state.
    pub state: RecordingState,
    /// Unique session ID for log correlation, set while a session exists.
    pub session_id: Option<Uuid>,
    /// Whole seconds recorded so far.
    pub elapsed_seconds: u64,
}
