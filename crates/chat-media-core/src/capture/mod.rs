mod active_flag;
mod image_capture;
mod permission_gate;
mod recording_state;
mod session;

pub use {
    active_flag::ActiveRecordingFlag,
    image_capture::ImageCapture,
    permission_gate::PermissionGate,
    recording_state::{RecordingState, SessionStatus},
    session::{CaptureSession, StartOutcome},
};
