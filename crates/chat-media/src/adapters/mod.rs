//! Concrete implementations of the core capability traits for a desktop
//! console host.

mod config_quota;
mod console_observer;
mod cpal_player;
mod cpal_recorder;
mod host_permissions;
mod local_storage;
mod path_image_source;

#[cfg(test)]
pub(crate) use {
    cpal_player::decode_wav,
    cpal_recorder::{SampleBuffer, write_wav},
};

pub(crate) use {
    config_quota::ConfigQuota, console_observer::ConsoleObserver, cpal_player::CpalPlayer,
    cpal_recorder::CpalRecorder, host_permissions::HostPermissions, local_storage::LocalStorage,
    path_image_source::PathImageSource,
};
