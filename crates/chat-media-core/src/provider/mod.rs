//! Capability interfaces the pipeline is written against.
//!
//! Concrete device, platform and storage code lives outside this crate and
//! is injected as `Arc<dyn ...>` trait objects.

mod audio_output;
mod capture_device;
mod permission;
mod storage;

pub use {
    audio_output::{AudioOutput, PlayerEvent, PlayerEvents, PlayerHandle},
    capture_device::{CaptureDevice, ImageSource, RecorderHandle},
    permission::{Permission, PermissionProvider, Platform},
    storage::{StorageBackend, StoragePath},
};
